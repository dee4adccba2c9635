pub struct Icons;

impl Icons {
    pub const STONE: &str = "🪨";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const INFO: &str = "ℹ️";
    pub const EMPTY: &str = "∅";
}
