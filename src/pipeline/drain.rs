use crossbeam_channel::Receiver;

/// Read and discard everything left on `input` until its producer closes it.
///
/// Run by a relay after cancellation so an upstream task blocked mid-handoff is released and can
/// exit. Returns only once the upstream sender is gone; an upstream that never closes keeps the
/// caller here (the producer has to honor cancellation too).
pub fn drain<T>(input: &Receiver<T>) -> usize {
    input.iter().count()
}
