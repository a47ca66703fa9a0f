// Core modules implementing path resolution, dispatch, recovery policy, and error modeling.
pub mod convert;
pub mod decode;
pub mod error;
pub mod keypath;
pub mod notify;
pub mod options;
pub mod policy;
pub mod shape;
