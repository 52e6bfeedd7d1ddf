pub mod query_envelope;
pub mod stop_record;

pub use query_envelope::{
    DATA_UNAVAILABLE_WARNING, NO_RESULTS_WARNING, QUERY_ENVELOPE_SCHEMA_VERSION, QueryEnvelope,
    QueryEnvelopeError, QueryEnvelopeWarning,
};
pub use stop_record::{
    STOP_RECORD_COLUMNS, StopRecord, deserialize_whole_number, json_schema, stored_flag,
};
