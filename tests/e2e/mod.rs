// End-to-end tests for the Postcast Backend API
//
// Each test boots the real router on an ephemeral port with an in-memory
// queue, a canned content source, stub speech engines and a storage stub
// that reports fixed artifact sizes. Tests share nothing and run in parallel.

mod helpers;
mod test_health;
mod test_process;
mod test_queue;
mod test_stats;
