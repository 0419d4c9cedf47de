/// Request-scoped identity placed into the request extensions by the
/// authentication gate and read by the admin gate and handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub is_admin: bool,
}
