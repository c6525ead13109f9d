pub mod accumulator;
pub mod assets;
pub mod clock;
pub mod distribution;
pub mod factory;
pub mod ledger;
pub mod pause;
pub mod position;
pub mod types;

pub use assets::{AssetLedger, MemoryAssets};
pub use clock::{StepClock, SystemClock, TimeSource};
pub use distribution::Distribution;
pub use factory::DistributionFactory;
pub use ledger::RewardLedger;
pub use pause::{PauseFlag, PauseProbe};
pub use position::StakerPosition;
pub use sluice_types::{AccountAddress, DistributionError, TokenAmount};
pub use types::{
    DistributionConfig, DistributionEvent, DistributionEventKind, DistributionMetrics,
    LifecycleState, RewardTokenMetrics,
};
