#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Job tracking core for lastore
//!
//! Package operations (download, install, remove) are tracked as long-lived
//! jobs. A [`JobQueue`] admits jobs, keeps them ordered by creation time and
//! rejects a second job for the same package and type. The [`JobManager`]
//! dispatches jobs to a [`PackageBackend`], merges the backend's progress
//! reports into the matching job and publishes only the properties that
//! actually changed. An install is a composite job: it starts life as a
//! download and is promoted in place to the install phase, keeping its id.

pub mod backend;
pub mod dispatch;
pub mod id;
pub mod job;
pub mod manager;
pub mod phase;
pub mod queue;

pub use backend::{progress_channel, PackageBackend, ProgressReceiver, ProgressSender};
pub use dispatch::JobDispatch;
pub use id::{JobIdAllocator, JobTicket};
pub use job::{Job, JobChanges};
pub use manager::JobManager;
pub use phase::JobPhase;
pub use queue::{JobHandle, JobQueue};
