use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tracing::trace;

use crate::config::LinkConfig;
use crate::protocol::plot_value::PlotValue;
use crate::protocol::sample_format::{format_batch, format_log, format_scalar, normalize_scalar_timestamp};
use crate::protocol::NEWLINE;
use crate::transport::selector::TransportSelector;
use crate::util::clock::Clock;


/// The application's write surface. Every emit call formats its text and hands it to the
///  transport selector; callers can not tell whether it was delivered or dropped.
pub struct SampleEmitter {
    selector: Arc<TransportSelector>,
    clock: Arc<dyn Clock>,
    scalar_timestamp_threshold_ms: u32,
    /// Timestamp of the next batch element. It continues across batches of all names and is
    ///  never reset.
    base_ms: AtomicU32,
}
impl SampleEmitter {
    pub fn new(selector: Arc<TransportSelector>, clock: Arc<dyn Clock>, config: &LinkConfig) -> SampleEmitter {
        SampleEmitter {
            selector,
            clock,
            scalar_timestamp_threshold_ms: config.scalar_timestamp_threshold_ms,
            base_ms: AtomicU32::new(0),
        }
    }

    /// Timestamps below the configured threshold are treated as tick counts rather than
    ///  wall-clock times, and replaced with the clock's current value.
    pub async fn emit_scalar<V: PlotValue + Sync + ?Sized>(&self, name: &str, timestamp_ms: u32, value: &V, unit: Option<&str>) {
        let timestamp_ms = normalize_scalar_timestamp(timestamp_ms, self.scalar_timestamp_threshold_ms, self.clock.now_millis());
        self.selector.send(&format_scalar(name, timestamp_ms, &value.render(), unit)).await;
    }

    pub async fn emit_scalar_now<V: PlotValue + Sync + ?Sized>(&self, name: &str, value: &V, unit: Option<&str>) {
        self.selector.send(&format_scalar(name, self.clock.now_millis(), &value.render(), unit)).await;
    }

    /// Element `i` is stamped `base + i * dt_ms`, and the running base advances past the whole
    ///  batch in a single step, so concurrent batches get disjoint timestamps.
    pub async fn emit_batch<T: Copy + Into<f64> + Sync>(&self, name: &str, dt_ms: u32, values: &[T], unit: Option<&str>) {
        let advance = dt_ms.wrapping_mul(values.len() as u32);
        let base_ms = self.base_ms.fetch_add(advance, Ordering::AcqRel);
        trace!(name, base_ms, num_values = values.len(), "emitting batch");

        self.selector.send(&format_batch(name, base_ms, dt_ms, values, unit)).await;
    }

    /// `None` or `Some(0)` stamps the line with the clock's current value
    pub async fn emit_log(&self, text: &str, timestamp_ms: Option<u32>) {
        let timestamp_ms = match timestamp_ms {
            Some(ts) if ts != 0 => ts,
            _ => self.clock.now_millis(),
        };
        self.selector.send(&format_log(timestamp_ms, text)).await;
    }

    pub async fn emit_raw(&self, text: &str) {
        self.selector.send(text).await;
    }

    pub async fn emit_raw_line(&self, text: &str) {
        self.selector.send(&format!("{}{}", text, NEWLINE)).await;
    }

    pub async fn emit_newline(&self) {
        self.selector.send(NEWLINE).await;
    }

    pub fn running_base_ms(&self) -> u32 {
        self.base_ms.load(Ordering::Acquire)
    }
}
