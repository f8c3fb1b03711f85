#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub tick_rate: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { tick_rate: 30 }
    }
}
