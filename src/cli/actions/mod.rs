pub mod server;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        providers: Option<String>,
        session_ttl: i64,
        credential_disabled: bool,
    },
}
