pub mod economic;
pub mod emergency;
pub mod intent;
pub mod needs;
pub mod resource;
pub mod rewrite;
pub mod text;

pub use economic::EconomicNeed;
pub use emergency::{EmergencyContact, EmergencyKind};
pub use intent::{Intent, IntentTag};
pub use needs::{Need, NeedKind, NeedsAnalysis};
pub use resource::{Resource, ResourceCategory, UrgencyLevel};
