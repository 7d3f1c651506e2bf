//! The fixed post-deployment checks
//!
//! Each scenario stands alone: it assumes only a fresh [`Deployment`](crate::core::Deployment),
//! never the side effects of an earlier scenario.
pub mod factory;
pub mod liquidity;
pub mod pair;
pub mod router;

pub use factory::FactoryFeeToSetter;
pub use liquidity::AddLiquidity;
pub use pair::CreatePair;
pub use router::RouterWiring;

use crate::utils::{HarnessError, Result};

/// Fail with an assertion error unless `condition` holds
pub(crate) fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(HarnessError::Assertion(message()))
    }
}
