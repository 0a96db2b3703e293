//! Shared helpers.

use uuid7::uuid7;

/// Correlation id attached to each transition request's log lines.
pub fn new_request_id() -> String {
    uuid7().to_string()
}
