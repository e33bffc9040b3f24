use core::fmt;
use core::num::NonZeroU32;

use embedded_hal::delay::DelayNs;

/// Destination for protocol words, one per cell.
pub trait WordSink {
    type Error;

    /// Hands one word to the transport, blocking until it has been taken.
    fn accept(&mut self, word: u32) -> Result<(), Self::Error>;

    /// Called before the first word of a frame.
    fn begin_frame(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called after the last word of a frame.
    fn end_frame(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<S: WordSink + ?Sized> WordSink for &mut S {
    type Error = S::Error;

    fn accept(&mut self, word: u32) -> Result<(), Self::Error> {
        (**self).accept(word)
    }

    fn begin_frame(&mut self) -> Result<(), Self::Error> {
        (**self).begin_frame()
    }

    fn end_frame(&mut self) -> Result<(), Self::Error> {
        (**self).end_frame()
    }
}

/// The transport did not make progress within its budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransmitTimeout {
    /// The word that was refused, or `None` if the frame never finished
    /// shifting out.
    pub word: Option<u32>,
}

impl fmt::Display for TransmitTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.word {
            Some(word) => write!(f, "transmit channel did not accept word {:#010x}", word),
            None => f.write_str("transmit channel did not drain"),
        }
    }
}

/// Polls `ready` until it returns true.
///
/// `budget` caps the number of polls; `None` waits forever.
fn wait_with_budget<F>(budget: Option<NonZeroU32>, mut ready: F) -> Result<(), ()>
where
    F: FnMut() -> bool,
{
    let mut polls = 0u32;
    while !ready() {
        if let Some(limit) = budget {
            polls += 1;
            if polls >= limit.get() {
                return Err(());
            }
        }
        core::hint::spin_loop();
    }
    Ok(())
}

/// Retries `try_push` until it reports the word as taken.
///
/// `budget` is the number of attempts made before giving up; `None` waits
/// forever.
pub fn push_with_budget<F>(word: u32, budget: Option<NonZeroU32>, mut try_push: F) -> Result<(), TransmitTimeout>
where
    F: FnMut(u32) -> bool,
{
    wait_with_budget(budget, || try_push(word)).map_err(|()| TransmitTimeout { word: Some(word) })
}

/// Ends a frame on a self-clocked LED chain.
///
/// Waits until `drained` reports the queue empty, then idles the line for
/// `tail_us`: the time the last queued word needs to shift out plus the
/// reset gap the LEDs need to latch the frame.
pub fn latch_frame<D, F>(
    budget: Option<NonZeroU32>,
    drained: F,
    delay: &mut D,
    tail_us: u32,
) -> Result<(), TransmitTimeout>
where
    D: DelayNs,
    F: FnMut() -> bool,
{
    wait_with_budget(budget, drained).map_err(|()| TransmitTimeout { word: None })?;
    delay.delay_us(tail_us);
    Ok(())
}

/// Sink that keeps every word it is given, for host tests.
#[cfg(test)]
pub(crate) mod recorder {
    use super::WordSink;
    use core::convert::Infallible;

    #[derive(Debug, Default)]
    pub(crate) struct RecordingSink {
        pub(crate) frames: Vec<Vec<u32>>,
        open: Option<Vec<u32>>,
        pub(crate) stray_words: usize,
    }

    impl RecordingSink {
        pub(crate) fn last_frame(&self) -> &[u32] {
            self.frames.last().map(Vec::as_slice).unwrap_or(&[])
        }
    }

    impl WordSink for RecordingSink {
        type Error = Infallible;

        fn accept(&mut self, word: u32) -> Result<(), Infallible> {
            match self.open.as_mut() {
                Some(frame) => frame.push(word),
                None => self.stray_words += 1,
            }
            Ok(())
        }

        fn begin_frame(&mut self) -> Result<(), Infallible> {
            assert!(self.open.is_none(), "frame started while another was open");
            self.open = Some(Vec::new());
            Ok(())
        }

        fn end_frame(&mut self) -> Result<(), Infallible> {
            let frame = self.open.take().expect("frame ended without being started");
            self.frames.push(frame);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;

    fn budget(n: u32) -> Option<NonZeroU32> {
        NonZeroU32::new(n)
    }

    #[test]
    fn unbounded_push_waits_for_acceptance() {
        let mut refusals = 3;
        let result = push_with_budget(0xAB00, None, |_| {
            if refusals == 0 {
                true
            } else {
                refusals -= 1;
                false
            }
        });
        assert_eq!(result, Ok(()));
        assert_eq!(refusals, 0);
    }

    #[test]
    fn bounded_push_gives_up() {
        let mut attempts = 0;
        let result = push_with_budget(0x1234_5600, budget(4), |_| {
            attempts += 1;
            false
        });
        assert_eq!(result, Err(TransmitTimeout { word: Some(0x1234_5600) }));
        assert_eq!(attempts, 4);
    }

    #[test]
    fn smallest_budget_is_a_single_attempt() {
        let mut attempts = 0;
        let result = push_with_budget(7, budget(1), |_| {
            attempts += 1;
            false
        });
        assert_eq!(result, Err(TransmitTimeout { word: Some(7) }));
        assert_eq!(attempts, 1);
        assert_eq!(budget(0), None);
    }

    #[test]
    fn bounded_push_succeeds_within_budget() {
        let mut attempts = 0;
        let result = push_with_budget(1, budget(4), |_| {
            attempts += 1;
            attempts == 4
        });
        assert_eq!(result, Ok(()));
    }

    struct Timeline<'a> {
        events: &'a RefCell<Vec<&'static str>>,
        idle_ns: u64,
    }

    impl DelayNs for Timeline<'_> {
        fn delay_ns(&mut self, ns: u32) {
            self.events.borrow_mut().push("idle");
            self.idle_ns += u64::from(ns);
        }
    }

    #[test]
    fn latch_idles_after_the_queue_drains() {
        let events = RefCell::new(Vec::new());
        let mut timeline = Timeline { events: &events, idle_ns: 0 };
        let mut polls = 0;
        let result = latch_frame(
            None,
            || {
                events.borrow_mut().push("poll");
                polls += 1;
                polls == 3
            },
            &mut timeline,
            330,
        );
        assert_eq!(result, Ok(()));
        assert_eq!(*events.borrow(), ["poll", "poll", "poll", "idle"]);
        assert_eq!(timeline.idle_ns, 330_000);
    }

    #[test]
    fn latch_reports_a_stuck_queue() {
        let events = RefCell::new(Vec::new());
        let mut timeline = Timeline { events: &events, idle_ns: 0 };
        let result = latch_frame(budget(5), || false, &mut timeline, 330);
        assert_eq!(result, Err(TransmitTimeout { word: None }));
        assert_eq!(timeline.idle_ns, 0);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn timeouts_say_what_failed() {
        assert_eq!(
            TransmitTimeout { word: Some(0xFF00) }.to_string(),
            "transmit channel did not accept word 0x0000ff00"
        );
        assert_eq!(
            TransmitTimeout { word: None }.to_string(),
            "transmit channel did not drain"
        );
    }
}
