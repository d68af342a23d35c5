/*!
 * Runtime Collaborators
 *
 * The deferred-result cell every waiter is built on, and the timer service
 * that fails waiters once their deadline passes:
 * - `TokioTimer` for real runtimes
 * - `ManualTimer` for deterministic tests and simulations
 */

mod deferred;
mod manual;
mod timer;
mod tokio_timer;
mod with_timeout;

pub use deferred::Deferred;
pub use manual::ManualTimer;
pub use timer::{Timer, TimerCallback, TimerHandle};
pub use tokio_timer::TokioTimer;
pub use with_timeout::WithTimeout;

pub(crate) use timer::arm_timeout;
