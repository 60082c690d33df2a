use super::map_slot::{read_action, MapSlot, ReadAction};
use super::{ProfilerError, QueryBackend};

const TIMESTAMP_COUNT: u32 = 2;
const RESULT_SIZE: u64 = TIMESTAMP_COUNT as u64 * std::mem::size_of::<u64>() as u64;

/// One elapsed-time query: a begin/end timestamp pair plus its read-back path.
pub struct WgpuQuery {
    id: u32,
    query_set: wgpu::QuerySet,
    resolve_buffer: wgpu::Buffer,
    staging_buffer: wgpu::Buffer,
    map: MapSlot,
}

/// `QueryBackend` built on wgpu timestamp queries.
///
/// Timestamps are written directly into the command encoder, so the device
/// needs both `TIMESTAMP_QUERY` and `TIMESTAMP_QUERY_INSIDE_ENCODERS`.
///
/// Read-back:
/// - `end_query` resolves the pair and copies it into a mappable buffer
/// - `query_submitted` requests the mapping
/// - `try_result_ns` polls without blocking and reads the mapped pair
///
/// A mapping still pending after a blocking poll is abandoned; its late
/// result is discarded rather than read on a later frame.
pub struct WgpuTimerBackend {
    device: wgpu::Device,
    /// Nanoseconds per timestamp tick.
    period_ns: f64,
    next_id: u32,
}

impl WgpuTimerBackend {
    /// Device features this backend relies on.
    pub fn required_features() -> wgpu::Features {
        wgpu::Features::TIMESTAMP_QUERY | wgpu::Features::TIMESTAMP_QUERY_INSIDE_ENCODERS
    }

    /// Returns true if `features` allows this backend to run.
    pub fn supported(features: wgpu::Features) -> bool {
        features.contains(Self::required_features())
    }

    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Self, ProfilerError> {
        if !Self::supported(device.features()) {
            return Err(ProfilerError::Unsupported(
                "device lacks TIMESTAMP_QUERY / TIMESTAMP_QUERY_INSIDE_ENCODERS",
            ));
        }

        let period_ns = queue.get_timestamp_period() as f64;
        log::debug!("wgpu timestamp period: {period_ns} ns/tick");

        Ok(Self {
            device: device.clone(),
            period_ns,
            next_id: 0,
        })
    }

    fn finish_read(&self, query: &WgpuQuery, action: ReadAction) -> Result<u64, ProfilerError> {
        match action {
            ReadAction::Read => {
                let ticks = {
                    let data = query.staging_buffer.slice(..).get_mapped_range();
                    let start = read_u64(&data[0..8]);
                    let end = read_u64(&data[8..16]);
                    end.saturating_sub(start)
                };
                query.staging_buffer.unmap();
                query.map.reset();
                Ok((ticks as f64 * self.period_ns).round() as u64)
            }
            ReadAction::Discard { unmap } => {
                if unmap {
                    query.staging_buffer.unmap();
                }
                query.map.reset();
                Err(ProfilerError::ReadbackFailed)
            }
            ReadAction::Abandon => {
                if query.map.abandon() {
                    log::warn!("gpu timer query {} still mapping after wait; abandoned", query.id);
                    return Err(ProfilerError::QueryNotReady);
                }
                // The callback landed between the poll and the abandon.
                self.finish_read(query, read_action(query.map.get(), true))
            }
            ReadAction::NotRecorded | ReadAction::InFlight | ReadAction::Wait => {
                Err(ProfilerError::QueryNotReady)
            }
        }
    }
}

impl QueryBackend for WgpuTimerBackend {
    type Query = WgpuQuery;
    type Encoder = wgpu::CommandEncoder;

    fn create_query(&mut self) -> Result<WgpuQuery, ProfilerError> {
        let id = self.next_id;

        let query_set = self.device.create_query_set(&wgpu::QuerySetDescriptor {
            label: Some("tess gpu timer query set"),
            ty: wgpu::QueryType::Timestamp,
            count: TIMESTAMP_COUNT,
        });

        let resolve_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tess gpu timer resolve buffer"),
            size: RESULT_SIZE,
            usage: wgpu::BufferUsages::QUERY_RESOLVE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let staging_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tess gpu timer staging buffer"),
            size: RESULT_SIZE,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        self.next_id += 1;

        Ok(WgpuQuery {
            id,
            query_set,
            resolve_buffer,
            staging_buffer,
            map: MapSlot::new(),
        })
    }

    fn destroy_query(&mut self, query: WgpuQuery) {
        if query.map.get().is_mapped() {
            query.staging_buffer.unmap();
        }
        query.resolve_buffer.destroy();
        query.staging_buffer.destroy();
        log::trace!("released gpu timer query {}", query.id);
    }

    fn begin_query(&mut self, encoder: &mut wgpu::CommandEncoder, query: &WgpuQuery) {
        encoder.write_timestamp(&query.query_set, 0);
    }

    fn end_query(&mut self, encoder: &mut wgpu::CommandEncoder, query: &WgpuQuery) {
        encoder.write_timestamp(&query.query_set, 1);

        // The staging buffer cannot be a copy target while mapped or mapping.
        if !query.map.get().can_record() {
            log::warn!("gpu timer query {} reused before read-back; result skipped", query.id);
            return;
        }

        encoder.resolve_query_set(&query.query_set, 0..TIMESTAMP_COUNT, &query.resolve_buffer, 0);
        encoder.copy_buffer_to_buffer(
            &query.resolve_buffer,
            0,
            &query.staging_buffer,
            0,
            RESULT_SIZE,
        );
    }

    fn query_submitted(&mut self, query: &WgpuQuery) {
        if !query.map.begin_map() {
            return;
        }

        let map = query.map.clone();
        query
            .staging_buffer
            .slice(..)
            .map_async(wgpu::MapMode::Read, move |result| map.complete(result.is_ok()));
    }

    fn try_result_ns(&mut self, query: &WgpuQuery) -> Result<u64, ProfilerError> {
        if read_action(query.map.get(), false) == ReadAction::NotRecorded {
            return Err(ProfilerError::QueryNotReady);
        }

        if let Err(e) = self.device.poll(wgpu::PollType::Poll) {
            log::warn!("device poll failed: {e}");
        }

        match read_action(query.map.get(), false) {
            ReadAction::Wait => {
                // One frame of slack was not enough; this stalls the CPU.
                log::warn!("gpu timer query {} not ready after a frame; waiting", query.id);
                self.wait_result_ns(query)
            }
            action => self.finish_read(query, action),
        }
    }

    fn wait_result_ns(&mut self, query: &WgpuQuery) -> Result<u64, ProfilerError> {
        // Nothing was copied for this query (skipped frame or busy staging buffer).
        if read_action(query.map.get(), true) == ReadAction::NotRecorded {
            return Err(ProfilerError::QueryNotReady);
        }

        if let Err(e) = self.device.poll(wgpu::PollType::wait_indefinitely()) {
            log::warn!("device poll failed: {e}");
        }

        self.finish_read(query, read_action(query.map.get(), true))
    }
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    u64::from_le_bytes(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_both_timestamp_features() {
        assert!(!WgpuTimerBackend::supported(wgpu::Features::empty()));
        assert!(!WgpuTimerBackend::supported(wgpu::Features::TIMESTAMP_QUERY));
        assert!(WgpuTimerBackend::supported(WgpuTimerBackend::required_features()));
    }

    #[test]
    fn result_holds_two_timestamps() {
        assert_eq!(RESULT_SIZE, 16);
    }

    #[test]
    fn read_u64_is_little_endian() {
        let bytes = 0x0102_0304_0506_0708u64.to_le_bytes();
        assert_eq!(read_u64(&bytes), 0x0102_0304_0506_0708);
    }
}
