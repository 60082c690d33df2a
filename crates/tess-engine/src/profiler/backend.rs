use super::ProfilerError;

/// Device-side elapsed-time queries, as consumed by [`GpuProfiler`].
///
/// `Encoder` is whatever command stream the backend records into. The wgpu
/// backend uses `wgpu::CommandEncoder`; test backends use `()`.
///
/// [`GpuProfiler`]: super::GpuProfiler
pub trait QueryBackend {
    type Query;
    type Encoder;

    /// Allocates one query object.
    fn create_query(&mut self) -> Result<Self::Query, ProfilerError>;

    /// Releases a query previously returned by `create_query`.
    fn destroy_query(&mut self, query: Self::Query);

    /// Starts recording elapsed time into `query`.
    fn begin_query(&mut self, encoder: &mut Self::Encoder, query: &Self::Query);

    /// Stops the query started by the matching `begin_query`.
    fn end_query(&mut self, encoder: &mut Self::Encoder, query: &Self::Query);

    /// Called once the commands that recorded `query` have been submitted.
    fn query_submitted(&mut self, query: &Self::Query) {
        let _ = query;
    }

    /// Returns the elapsed nanoseconds recorded by `query`.
    ///
    /// Expected to return promptly when called a full frame after the query
    /// ended; `QueryNotReady` then means the one-frame lag was not enough.
    fn try_result_ns(&mut self, query: &Self::Query) -> Result<u64, ProfilerError>;

    /// Like `try_result_ns`, but blocks until the GPU has produced the value.
    fn wait_result_ns(&mut self, query: &Self::Query) -> Result<u64, ProfilerError>;
}
