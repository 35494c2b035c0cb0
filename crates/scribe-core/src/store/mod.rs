pub mod memory;
pub mod remote;

pub use memory::{MemoryStore, WriteLog};
pub use remote::{
    server_timestamp, Direction, Document, FieldOp, LiveQuery, Query, RemoteStore, Snapshot,
    StoreError,
};
