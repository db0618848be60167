//! Firehose HTTP delivery processing (the request-scoped core).
//!
//! # Data Flow
//! ```text
//! request body
//!     → types.rs (DeliveryBatch: requestId, timestamp, records[])
//! common-attributes header
//!     → classify.rs (EventType, once per batch)
//! for each record, in order:
//!     → decode.rs (base64, then gzip+JSON or plain text)
//!     → transform.rs (1 message, or 1 per CloudWatch log event)
//!     → forward::ForwardAdapter
//!     → pipeline.rs collects a RecordOutcome
//! ```
//!
//! # Design Decisions
//! - EventType is a closed enum matched exhaustively; unknown types drop records
//! - Record payloads stay base64 text until decode, so one bad record never
//!   fails the batch parse
//! - Per-record failures are values (RecordOutcome), not log lines only

pub mod classify;
pub mod decode;
pub mod pipeline;
pub mod transform;
pub mod types;

pub use classify::{classify, EventType};
pub use decode::{CloudWatchLogsEvent, DecodeError, DecodedEvent, LogEvent};
pub use pipeline::{process_batch, BatchReport, RecordOutcome, SkipReason};
pub use types::{CommonAttributes, DeliveryBatch, RawRecord, ResponseBody};
