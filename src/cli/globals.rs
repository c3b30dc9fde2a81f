use secrecy::SecretString;

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub base_url: String,
    pub secret: SecretString,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            secret: SecretString::default(),
        }
    }

    pub fn set_secret(&mut self, secret: SecretString) {
        self.secret = secret;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let base_url = "https://id.example.com".to_string();
        let mut args = GlobalArgs::new(base_url);
        assert_eq!(args.base_url, "https://id.example.com");
        assert_eq!(args.secret.expose_secret(), "");

        args.set_secret(SecretString::from("cookie-secret".to_string()));
        assert_eq!(args.secret.expose_secret(), "cookie-secret");
    }
}
