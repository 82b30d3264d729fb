//! Barcode capture
//!
//! A capture source produces raw decoded codes (camera decoder, handheld
//! scanner, test script). A [`ScanSession`] runs one source until it yields a
//! valid retail barcode, honors that single detection and shuts the source
//! down. Sources that fail to open leave the session inert.

use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Retail 1D symbologies accepted by a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbology {
    /// 13 digits
    Ean13,
    /// 12 digits
    UpcA,
    /// 8 digits, zero-suppressed UPC-A
    UpcE,
}

/// Identify the symbology of a decoded code and verify its check digit
pub fn classify(code: &str) -> Option<Symbology> {
    if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits: Vec<u32> = code.bytes().map(|b| u32::from(b - b'0')).collect();

    match digits.len() {
        13 if check_digit_ok(&digits) => Some(Symbology::Ean13),
        12 if check_digit_ok(&digits) => Some(Symbology::UpcA),
        8 => expand_upc_e(&digits)
            .filter(|upc_a| check_digit_ok(upc_a))
            .map(|_| Symbology::UpcE),
        _ => None,
    }
}

/// GS1 mod-10 check: weights 3,1,3,... from the right of the payload
fn check_digit_ok(digits: &[u32]) -> bool {
    let Some((&check, payload)) = digits.split_last() else {
        return false;
    };
    let sum: u32 = payload
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| if i % 2 == 0 { d * 3 } else { d })
        .sum();
    (10 - sum % 10) % 10 == check
}

/// Expand an 8-digit UPC-E code (number system, six digits, check) to UPC-A
fn expand_upc_e(digits: &[u32]) -> Option<Vec<u32>> {
    let (ns, body, check) = (digits[0], &digits[1..7], digits[7]);
    if ns > 1 {
        return None;
    }
    let [x1, x2, x3, x4, x5, x6] = [body[0], body[1], body[2], body[3], body[4], body[5]];

    let middle = match x6 {
        0..=2 => [x1, x2, x6, 0, 0, 0, 0, x3, x4, x5],
        3 => [x1, x2, x3, 0, 0, 0, 0, 0, x4, x5],
        4 => [x1, x2, x3, x4, 0, 0, 0, 0, 0, x5],
        _ => [x1, x2, x3, x4, x5, 0, 0, 0, 0, x6],
    };

    let mut upc_a = Vec::with_capacity(12);
    upc_a.push(ns);
    upc_a.extend_from_slice(&middle);
    upc_a.push(check);
    Some(upc_a)
}

/// A detected barcode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub barcode: String,
    pub symbology: Symbology,
    /// Capture date, offered as the item's expiry when none is entered
    pub default_expiry: NaiveDate,
}

/// How a scan session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Detected(Detection),
    /// Stream closed or user gave up before a valid code was read
    Cancelled,
    /// Source could not be opened (no camera, no permission, ...)
    Unavailable,
}

/// Something that yields decoded barcode strings
#[async_trait]
pub trait CaptureSource: Send {
    /// Start the stream
    async fn open(&mut self) -> Result<()>;

    /// Next decoded code; `None` once the stream is closed or cancelled
    async fn next_code(&mut self) -> Option<String>;

    /// Stop the stream
    async fn close(&mut self);
}

/// One scan: open, wait for the first valid code, close
pub struct ScanSession<S> {
    source: S,
}

impl<S: CaptureSource> ScanSession<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Run the session to completion. Consumes the session, so at most one
    /// detection is ever honored.
    pub async fn run(mut self, today: NaiveDate) -> ScanOutcome {
        if let Err(e) = self.source.open().await {
            log::error!("Failed to start barcode capture: {}", e);
            return ScanOutcome::Unavailable;
        }

        let outcome = loop {
            let Some(code) = self.source.next_code().await else {
                log::info!("Barcode capture cancelled");
                break ScanOutcome::Cancelled;
            };

            match classify(&code) {
                Some(symbology) => {
                    log::info!("Detected {:?} barcode {}", symbology, code);
                    break ScanOutcome::Detected(Detection {
                        barcode: code,
                        symbology,
                        default_expiry: today,
                    });
                }
                None => log::debug!("Ignoring unreadable code '{}'", code),
            }
        };

        self.source.close().await;
        outcome
    }
}

/// Codes read line by line, as typed by a keyboard-wedge barcode reader.
///
/// An empty line or end of input cancels the scan.
pub struct LineSource<R> {
    reader: R,
}

impl<R> LineSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

#[async_trait]
impl<R> CaptureSource for LineSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn open(&mut self) -> Result<()> {
        Ok(())
    }

    async fn next_code(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line).await {
            Ok(0) => None,
            Ok(_) => {
                let code = line.trim();
                if code.is_empty() {
                    None
                } else {
                    Some(code.to_string())
                }
            }
            Err(e) => {
                log::warn!("Failed to read barcode input: {}", e);
                None
            }
        }
    }

    async fn close(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StockError;
    use std::collections::VecDeque;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    /// Scripted source that records its lifecycle
    struct ScriptedSource {
        codes: VecDeque<&'static str>,
        fail_open: bool,
        closed: bool,
    }

    impl ScriptedSource {
        fn new(codes: &[&'static str]) -> Self {
            Self {
                codes: codes.iter().copied().collect(),
                fail_open: false,
                closed: false,
            }
        }
    }

    #[async_trait]
    impl<'a> CaptureSource for &'a mut ScriptedSource {
        async fn open(&mut self) -> Result<()> {
            if self.fail_open {
                return Err(StockError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "camera permission denied",
                )));
            }
            Ok(())
        }

        async fn next_code(&mut self) -> Option<String> {
            self.codes.pop_front().map(str::to_string)
        }

        async fn close(&mut self) {
            self.closed = true;
        }
    }

    #[test]
    fn test_classify_ean13() {
        assert_eq!(classify("4006381333931"), Some(Symbology::Ean13));
        assert_eq!(classify("3017620422003"), Some(Symbology::Ean13));
        assert_eq!(classify("4006381333932"), None);
    }

    #[test]
    fn test_classify_upc_a() {
        assert_eq!(classify("036000291452"), Some(Symbology::UpcA));
        assert_eq!(classify("036000291453"), None);
    }

    #[test]
    fn test_classify_upc_e() {
        // 0425261 expands to 042100005264
        assert_eq!(classify("04252614"), Some(Symbology::UpcE));
        assert_eq!(classify("04252615"), None);
        // number system 2 is not valid for UPC-E
        assert_eq!(classify("24252614"), None);
    }

    #[test]
    fn test_classify_rejects_non_digits_and_odd_lengths() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("40063813339A1"), None);
        assert_eq!(classify("12345"), None);
    }

    #[test]
    fn test_upc_e_expansion_rules() {
        let expand = |s: &str| {
            let digits: Vec<u32> = s.bytes().map(|b| u32::from(b - b'0')).collect();
            expand_upc_e(&digits)
                .unwrap()
                .iter()
                .map(|d| char::from_digit(*d, 10).unwrap())
                .collect::<String>()
        };
        assert_eq!(expand("01234505"), "012000003455");
        assert_eq!(expand("01234531"), "012300000451");
        assert_eq!(expand("01234541"), "012340000051");
        assert_eq!(expand("01234562"), "012345000062");
    }

    #[tokio::test]
    async fn test_session_honors_first_valid_code_only() {
        let mut source = ScriptedSource::new(&["garbage", "4006381333931", "036000291452"]);

        let outcome = ScanSession::new(&mut source).run(today()).await;

        assert_eq!(
            outcome,
            ScanOutcome::Detected(Detection {
                barcode: "4006381333931".to_string(),
                symbology: Symbology::Ean13,
                default_expiry: today(),
            })
        );
        assert!(source.closed);
        // the second code was never consumed
        assert_eq!(source.codes.len(), 1);
    }

    #[tokio::test]
    async fn test_session_cancelled_when_stream_ends() {
        let mut source = ScriptedSource::new(&["123"]);
        let outcome = ScanSession::new(&mut source).run(today()).await;
        assert_eq!(outcome, ScanOutcome::Cancelled);
        assert!(source.closed);
    }

    #[tokio::test]
    async fn test_session_unavailable_when_open_fails() {
        let mut source = ScriptedSource::new(&["4006381333931"]);
        source.fail_open = true;

        let outcome = ScanSession::new(&mut source).run(today()).await;

        assert_eq!(outcome, ScanOutcome::Unavailable);
        assert_eq!(source.codes.len(), 1);
    }

    #[tokio::test]
    async fn test_line_source_reads_until_blank_line() {
        let input: &[u8] = b"  036000291452 \n\n4006381333931\n";
        let mut source = LineSource::new(input);

        assert_eq!(source.next_code().await.as_deref(), Some("036000291452"));
        assert_eq!(source.next_code().await, None);
    }

    #[tokio::test]
    async fn test_line_source_session() {
        let input: &[u8] = b"not-a-code\n036000291452\n";
        let outcome = ScanSession::new(LineSource::new(input)).run(today()).await;
        assert!(matches!(outcome, ScanOutcome::Detected(d) if d.symbology == Symbology::UpcA));
    }
}
