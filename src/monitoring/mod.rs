/*!
 * Monitoring
 * Tracing subscriber initialisation
 */

mod tracer;

pub use tracer::init_tracing;
