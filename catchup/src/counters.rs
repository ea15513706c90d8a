// Copyright © Tessera Labs
// SPDX-License-Identifier: Apache-2.0

use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

/// Count of inbound catchup messages, by wire `op`.
pub static RECEIVED_MESSAGE_COUNT: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "tessera_seeder_received_message_count",
        "Number of catchup messages received by the seeder",
        &["op"]
    )
    .unwrap()
});

/// Count of inbound messages dropped without a reply.
pub static DISCARDED_MESSAGE_COUNT: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "tessera_seeder_discarded_message_count",
        "Number of inbound catchup messages the seeder discarded"
    )
    .unwrap()
});

/// Count of outbound messages, by wire `op`.
pub static SENT_MESSAGE_COUNT: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "tessera_seeder_sent_message_count",
        "Number of messages the seeder handed to the transport",
        &["op"]
    )
    .unwrap()
});

/// Count of transport-driven splits of oversized catchup replies.
pub static CATCHUP_REP_SPLIT_COUNT: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "tessera_seeder_catchup_rep_split_count",
        "Number of times an oversized catchup reply was split in two"
    )
    .unwrap()
});

/// Count of split attempts that could not proceed (single-transaction
/// replies).
pub static CATCHUP_REP_SPLIT_FAILURE_COUNT: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "tessera_seeder_catchup_rep_split_failure_count",
        "Number of split attempts abandoned because the reply was too small to halve"
    )
    .unwrap()
});
