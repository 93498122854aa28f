//! Response memory guard
//!
//! Bounds worst-case retained memory after materialization. A response
//! with a very large hit buffer keeps that allocation alive for as long
//! as the response value itself is reachable; once the materializer has
//! consumed the hits, nothing reads them again. The guard releases the
//! buffer at that point instead of waiting for the response to go out
//! of scope.
//!
//! This is a heuristic, not a correctness requirement: the guard never
//! alters the materialized result, only memory retention.

use super::model::SearchResponse;

/// Hit-buffer capacity above which the buffer is released
pub const LARGE_HIT_BUFFER: usize = 4096;

/// Releases an over-threshold hit buffer
///
/// Replaces the hit vector with an empty one (dropping the allocation
/// immediately; clearing alone would keep the capacity reserved) when
/// its capacity exceeds [`LARGE_HIT_BUFFER`]. Buffers at or below the
/// threshold are left untouched. Returns true if a release happened.
pub fn release_large_hit_buffer(response: &mut SearchResponse) -> bool {
    if response.hits.hits.capacity() > LARGE_HIT_BUFFER {
        response.hits.hits = Vec::new();
        true
    } else {
        false
    }
}
