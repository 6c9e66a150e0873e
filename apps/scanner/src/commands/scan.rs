//! # Scan Commands
//!
//! Turning a barcode (typed or decoded from an image) into a line item.
//!
//! ## Scan Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  scan_image(image)                                                      │
//! │     │  decode_image (blocking pool) ──► NO_BARCODE, shown once         │
//! │     ▼                                                                   │
//! │  scan_barcode(barcode)                                                  │
//! │     │  validate_barcode                                                 │
//! │     │  BillState::begin_scan ──► rescan? counted, done                  │
//! │     │  catalog.lookup(barcode).await       (bill lock NOT held)         │
//! │     ▼  BillState::complete_scan ──► Added | Incremented | Discarded     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use tracing::debug;

use crate::catalog::ProductCatalog;
use crate::decoder::{decode_image, BarcodeDecoder, ImageData};
use crate::error::ApiError;
use crate::state::{BillState, ScanOutcome, ScanStart};
use greenbill_core::validation::validate_barcode;
use greenbill_core::CoreError;

/// Scans a barcode into the current bill.
///
/// ## Behavior
/// - Barcode already on the bill: quantity + 1, no lookup
/// - New barcode: looked up in `catalog`, then appended
/// - Bill started or cleared while the lookup ran: result discarded
///
/// ## Errors
/// - `VALIDATION_ERROR` for a blank or malformed barcode
/// - `NO_ACTIVE_BILL` / `INACTIVE_BILL`
/// - `NOT_FOUND` if the catalog has no such product
/// - `CATALOG_UNAVAILABLE` if the catalog could not answer
pub async fn scan_barcode(
    bill: &BillState,
    catalog: &dyn ProductCatalog,
    barcode: String,
) -> Result<ScanOutcome, ApiError> {
    debug!(barcode = %barcode, "scan_barcode command");
    let barcode = validate_barcode(&barcode).map_err(|e| ApiError::validation(e.to_string()))?;

    let ticket = match bill.begin_scan(&barcode)? {
        ScanStart::Done(outcome) => return Ok(outcome),
        ScanStart::NeedsLookup(ticket) => ticket,
    };

    let result = catalog.lookup(ticket.barcode()).await;
    bill.complete_scan(ticket, result)
}

/// Decodes a barcode from an image and scans it.
///
/// The bill is checked before decoding so an idle or ended session fails
/// fast. A failed decode is reported once and not retried.
pub async fn scan_image(
    bill: &BillState,
    catalog: &dyn ProductCatalog,
    decoder: Arc<dyn BarcodeDecoder>,
    image: ImageData,
) -> Result<ScanOutcome, ApiError> {
    debug!(bytes = image.bytes.len(), "scan_image command");

    if let Some(bill_id) = bill.with_bill(|b| (!b.is_active()).then(|| b.id().to_string()))? {
        return Err(CoreError::inactive(bill_id).into());
    }

    let barcode = decode_image(decoder, image).await?;
    scan_barcode(bill, catalog, barcode).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::error::ErrorCode;
    use crate::presenter::NoOpPresenter;
    use async_trait::async_trait;
    use greenbill_core::{EcoGrade, LookupError, ProductInfo};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new()
            .with_product("111", ProductInfo::new("Oat Milk", EcoGrade::A))
            .with_product("222", ProductInfo::new("Cheddar", EcoGrade::C))
    }

    fn bill_state() -> BillState {
        let bill = BillState::new(Arc::new(NoOpPresenter), 50).unwrap();
        bill.start().unwrap();
        bill
    }

    /// Holds every lookup until released.
    #[derive(Default)]
    struct GatedCatalog {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl ProductCatalog for GatedCatalog {
        async fn lookup(&self, barcode: &str) -> Result<ProductInfo, LookupError> {
            self.started.notify_one();
            self.release.notified().await;
            catalog().lookup(barcode).await
        }
    }

    #[derive(Default)]
    struct CountingCatalog {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ProductCatalog for CountingCatalog {
        async fn lookup(&self, barcode: &str) -> Result<ProductInfo, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            catalog().lookup(barcode).await
        }
    }

    struct DownCatalog;

    #[async_trait]
    impl ProductCatalog for DownCatalog {
        async fn lookup(&self, _barcode: &str) -> Result<ProductInfo, LookupError> {
            Err(LookupError::Unavailable("connection refused".into()))
        }
    }

    struct TextDecoder;

    impl BarcodeDecoder for TextDecoder {
        fn decode(&self, image: &ImageData) -> Option<String> {
            String::from_utf8(image.bytes.clone()).ok().filter(|s| !s.is_empty())
        }
    }

    #[tokio::test]
    async fn test_scan_adds_then_increments() {
        let bill = bill_state();
        let catalog = CountingCatalog::default();

        let first = scan_barcode(&bill, &catalog, " 111 ".into()).await.unwrap();
        assert!(matches!(first, ScanOutcome::Added { ref item, .. } if item.barcode == "111"));

        let second = scan_barcode(&bill, &catalog, "111".into()).await.unwrap();
        assert!(matches!(second, ScanOutcome::Incremented { ref item, .. } if item.quantity == 2));

        assert_eq!(catalog.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_barcode_is_not_found() {
        let bill = bill_state();
        let err = scan_barcode(&bill, &catalog(), "999".into()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(bill.with_bill(|b| b.is_empty()).unwrap());
    }

    #[tokio::test]
    async fn test_catalog_down_is_unavailable() {
        let bill = bill_state();
        let err = scan_barcode(&bill, &DownCatalog, "111".into()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CatalogUnavailable);
    }

    #[tokio::test]
    async fn test_blank_barcode_is_validation_error() {
        let bill = bill_state();
        let err = scan_barcode(&bill, &catalog(), "   ".into()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_clear_during_lookup_discards_result() {
        let bill = bill_state();
        let catalog = Arc::new(GatedCatalog::default());

        let task = {
            let bill = bill.clone();
            let catalog = catalog.clone();
            tokio::spawn(async move { scan_barcode(&bill, catalog.as_ref(), "111".into()).await })
        };

        catalog.started.notified().await;
        bill.clear().unwrap();
        catalog.release.notify_one();

        let outcome = task.await.unwrap().unwrap();
        assert!(matches!(outcome, ScanOutcome::Discarded { .. }));
        assert!(bill.with_bill(|b| b.is_empty()).unwrap());
    }

    #[tokio::test]
    async fn test_reads_not_blocked_during_lookup() {
        let bill = bill_state();
        let catalog = Arc::new(GatedCatalog::default());

        let task = {
            let bill = bill.clone();
            let catalog = catalog.clone();
            tokio::spawn(async move { scan_barcode(&bill, catalog.as_ref(), "222".into()).await })
        };

        catalog.started.notified().await;
        assert!(bill.view().unwrap().items.is_empty());
        catalog.release.notify_one();

        assert!(matches!(
            task.await.unwrap().unwrap(),
            ScanOutcome::Added { .. }
        ));
    }

    #[tokio::test]
    async fn test_scan_image() {
        let bill = bill_state();
        let outcome = scan_image(
            &bill,
            &catalog(),
            Arc::new(TextDecoder),
            ImageData::new(b"222".to_vec(), Some("image/png".into())),
        )
        .await
        .unwrap();
        assert!(matches!(outcome, ScanOutcome::Added { .. }));

        let err = scan_image(&bill, &catalog(), Arc::new(TextDecoder), ImageData::new(Vec::new(), None))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NoBarcode);
    }

    #[tokio::test]
    async fn test_scan_image_on_ended_bill_fails_before_decode() {
        let bill = bill_state();
        scan_barcode(&bill, &catalog(), "111".into()).await.unwrap();
        bill.end().unwrap();

        let err = scan_image(&bill, &catalog(), Arc::new(TextDecoder), ImageData::new(Vec::new(), None))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InactiveBill);
    }
}
