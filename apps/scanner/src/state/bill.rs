//! # Bill State
//!
//! Owns the scanner session: at most one bill, plus a generation counter
//! that invalidates catalog lookups still in flight.
//!
//! ## Scan Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  begin_scan("111")            (lock held)                              │
//! │     ├── already on bill ──► quantity += 1 ──► render ──► Incremented   │
//! │     └── new barcode ──────► LookupTicket { generation: 7, "111" }      │
//! │                                  │                                      │
//! │                                  ▼        (lock released)              │
//! │                       catalog.lookup("111").await                      │
//! │                                  │                                      │
//! │                                  ▼                                      │
//! │  complete_scan(ticket, result)  (lock held)                            │
//! │     ├── generation still 7 ──► add_or_increment ──► render ──► Added   │
//! │     └── generation moved on ─► Discarded (start/clear/end/save ran)    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! The session is an `Arc<Mutex<Session>>`. Every mutation happens under the
//! lock and ends with a presenter render, so views are emitted in order.
//! Lookups never run under the lock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::presenter::{BillView, ItemView, Presenter};
use greenbill_core::validation::validate_benchmark_points;
use greenbill_core::{
    Bill, BillSummary, CoreError, CoreResult, LookupError, ProductInfo, QuantityChange,
};

#[derive(Debug, Default)]
struct Session {
    bill: Option<Bill>,
    generation: u64,
}

impl Session {
    fn bill(&self) -> Result<&Bill, ApiError> {
        self.bill.as_ref().ok_or_else(ApiError::no_active_bill)
    }

    fn bill_mut(&mut self) -> Result<&mut Bill, ApiError> {
        self.bill.as_mut().ok_or_else(ApiError::no_active_bill)
    }
}

/// Permission to apply one lookup result, valid for one bill generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    generation: u64,
    barcode: String,
}

impl LookupTicket {
    pub fn barcode(&self) -> &str {
        &self.barcode
    }
}

/// First half of a scan.
#[derive(Debug)]
pub enum ScanStart {
    /// The barcode was already on the bill; it was counted without a lookup.
    Done(ScanOutcome),

    /// The caller must look the barcode up and pass the result to
    /// [`BillState::complete_scan`].
    NeedsLookup(LookupTicket),
}

/// What a scan did to the bill.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanOutcome {
    /// New line item appended.
    Added { item: ItemView, view: BillView },

    /// Existing line item's quantity went up by one.
    Incremented { item: ItemView, view: BillView },

    /// The bill changed while the lookup was running; the result was dropped.
    Discarded { barcode: String },
}

/// Shared handle to the scanner session.
#[derive(Clone)]
pub struct BillState {
    session: Arc<Mutex<Session>>,
    presenter: Arc<dyn Presenter>,
    benchmark_points: i64,
}

impl BillState {
    /// Creates an idle session (no bill).
    ///
    /// ## Errors
    /// `CONFIG_ERROR` if `benchmark_points` is not positive.
    pub fn new(presenter: Arc<dyn Presenter>, benchmark_points: i64) -> Result<Self, ApiError> {
        validate_benchmark_points(benchmark_points)?;

        Ok(BillState {
            session: Arc::new(Mutex::new(Session::default())),
            presenter,
            benchmark_points,
        })
    }

    pub fn benchmark_points(&self) -> i64 {
        self.benchmark_points
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        // A panicking presenter must not brick the scanner; the session
        // itself is never left half-updated.
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn render(&self, bill: &Bill) -> Result<BillView, ApiError> {
        let view = BillView::build(bill, self.benchmark_points)?;
        self.presenter.render(&view);
        Ok(view)
    }

    /// Runs `f` against the current bill.
    pub fn with_bill<F, R>(&self, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&Bill) -> R,
    {
        let session = self.lock();
        Ok(f(session.bill()?))
    }

    /// Runs a fallible mutation and renders the result.
    fn with_bill_mut<F, R>(&self, f: F) -> Result<(R, BillView), ApiError>
    where
        F: FnOnce(&mut Bill) -> CoreResult<R>,
    {
        let mut session = self.lock();
        let bill = session.bill_mut()?;
        let result = f(bill)?;
        let view = self.render(bill)?;
        Ok((result, view))
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Replaces any current bill with a fresh one.
    pub fn start(&self) -> Result<BillView, ApiError> {
        let mut session = self.lock();

        let bill = Bill::start();
        let view = self.render(&bill)?;

        if let Some(old) = session.bill.replace(bill) {
            debug!(bill_id = %old.id(), "Previous bill discarded");
        }
        session.generation += 1;

        info!(bill_id = %view.bill_id, generation = session.generation, "Bill started");
        Ok(view)
    }

    /// Current bill's view.
    pub fn view(&self) -> Result<BillView, ApiError> {
        let session = self.lock();
        Ok(BillView::build(session.bill()?, self.benchmark_points)?)
    }

    /// Empties the bill and invalidates in-flight lookups.
    pub fn clear(&self) -> Result<BillView, ApiError> {
        let mut session = self.lock();
        let bill = session.bill_mut()?;
        bill.clear()?;
        let view = self.render(bill)?;
        session.generation += 1;

        info!(bill_id = %view.bill_id, "Bill cleared");
        Ok(view)
    }

    /// Ends the bill, returning its summary. In-flight lookups are dropped.
    pub fn end(&self) -> Result<(BillSummary, BillView), ApiError> {
        let mut session = self.lock();
        let bill = session.bill_mut()?;
        let summary = bill.end()?;
        let view = self.render(bill)?;
        session.generation += 1;

        info!(
            bill_id = %summary.bill_id,
            items = summary.summary.total_items,
            points = summary.summary.total_greenpoints,
            "Bill ended"
        );
        Ok((summary, view))
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    /// Counts a rescan immediately, or issues a ticket for a catalog lookup.
    ///
    /// ## Errors
    /// - `NO_ACTIVE_BILL` if no bill was started
    /// - `INACTIVE_BILL` if the bill has ended
    pub fn begin_scan(&self, barcode: &str) -> Result<ScanStart, ApiError> {
        let mut session = self.lock();
        let generation = session.generation;
        let bill = session.bill_mut()?;

        if !bill.is_active() {
            return Err(CoreError::inactive(bill.id()).into());
        }

        if !bill.contains(barcode) {
            debug!(barcode = %barcode, generation, "Lookup required");
            return Ok(ScanStart::NeedsLookup(LookupTicket {
                generation,
                barcode: barcode.to_string(),
            }));
        }

        // Known barcode: the lookup closure is never called.
        let item = bill.add_or_increment(barcode, |b| {
            Err(LookupError::NotFound(b.to_string()).into())
        })?;
        let item = ItemView::from(item);
        let view = self.render(bill)?;

        debug!(barcode = %barcode, quantity = item.quantity, "Rescan counted");
        Ok(ScanStart::Done(ScanOutcome::Incremented { item, view }))
    }

    /// Applies a lookup result if its ticket is still current.
    ///
    /// A barcode that another scan added while this lookup was running is
    /// incremented rather than duplicated.
    ///
    /// ## Errors
    /// The lookup's own error (`NOT_FOUND`, `CATALOG_UNAVAILABLE`) when the
    /// ticket is current; the bill is left unchanged.
    pub fn complete_scan(
        &self,
        ticket: LookupTicket,
        result: Result<ProductInfo, LookupError>,
    ) -> Result<ScanOutcome, ApiError> {
        let mut session = self.lock();

        if session.generation != ticket.generation {
            warn!(
                barcode = %ticket.barcode,
                ticket_generation = ticket.generation,
                current_generation = session.generation,
                "Discarding stale lookup"
            );
            return Ok(ScanOutcome::Discarded {
                barcode: ticket.barcode,
            });
        }

        let bill = session.bill_mut()?;
        let existed = bill.contains(&ticket.barcode);

        let item = bill.add_or_increment(&ticket.barcode, move |_| result.map_err(CoreError::from))?;
        let item = ItemView::from(item);
        let view = self.render(bill)?;

        if existed {
            Ok(ScanOutcome::Incremented { item, view })
        } else {
            info!(barcode = %item.barcode, grade = %item.grade, "Item added");
            Ok(ScanOutcome::Added { item, view })
        }
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Adds `delta` to an item's quantity (removing it below 1).
    pub fn update_quantity(
        &self,
        barcode: &str,
        delta: i64,
    ) -> Result<(QuantityChange, BillView), ApiError> {
        self.with_bill_mut(|bill| bill.change_quantity(barcode, delta))
    }

    /// Removes an item. The flag says whether anything was removed.
    pub fn remove(&self, barcode: &str) -> Result<(bool, BillView), ApiError> {
        self.with_bill_mut(|bill| bill.remove(barcode))
    }

    // =========================================================================
    // Save / Export
    // =========================================================================

    /// Summary of the ended bill, stamped with its end time.
    ///
    /// ## Errors
    /// - `NO_ACTIVE_BILL` if there is no bill
    /// - `BILL_STILL_OPEN` if the bill has not been ended
    pub fn closed_summary(&self) -> Result<BillSummary, ApiError> {
        let session = self.lock();
        let bill = session.bill()?;

        let Some(ended_at) = bill.ended_at() else {
            return Err(ApiError::bill_still_open(bill.id()));
        };

        Ok(bill.export_snapshot_at(ended_at)?)
    }

    /// Snapshot of the current bill for export, open or closed.
    pub fn export_summary(&self) -> Result<BillSummary, ApiError> {
        let session = self.lock();
        Ok(session.bill()?.export_snapshot_at(Utc::now())?)
    }

    /// Returns the session to idle if `bill_id` is still the current bill.
    pub fn finish(&self, bill_id: &str) -> bool {
        let mut session = self.lock();

        if session.bill.as_ref().map(Bill::id) != Some(bill_id) {
            return false;
        }

        session.bill = None;
        session.generation += 1;
        self.presenter.reset();

        info!(bill_id = %bill_id, "Session reset to idle");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::presenter::NoOpPresenter;
    use greenbill_core::EcoGrade;

    #[derive(Default)]
    struct RecordingPresenter {
        views: Mutex<Vec<BillView>>,
        resets: Mutex<usize>,
    }

    impl Presenter for RecordingPresenter {
        fn render(&self, view: &BillView) {
            self.views.lock().unwrap().push(view.clone());
        }

        fn reset(&self) {
            *self.resets.lock().unwrap() += 1;
        }
    }

    fn state() -> BillState {
        BillState::new(Arc::new(NoOpPresenter), 50).unwrap()
    }

    fn info(barcode: &str) -> Result<ProductInfo, LookupError> {
        match barcode {
            "111" => Ok(ProductInfo::new("Oat Milk", EcoGrade::A)),
            "222" => Ok(ProductInfo::new("Cheddar", EcoGrade::C)),
            other => Err(LookupError::NotFound(other.to_string())),
        }
    }

    /// begin + complete with no interleaving.
    fn scan(state: &BillState, barcode: &str) -> Result<ScanOutcome, ApiError> {
        match state.begin_scan(barcode)? {
            ScanStart::Done(outcome) => Ok(outcome),
            ScanStart::NeedsLookup(ticket) => state.complete_scan(ticket, info(barcode)),
        }
    }

    fn ticket(start: ScanStart) -> LookupTicket {
        match start {
            ScanStart::NeedsLookup(ticket) => ticket,
            ScanStart::Done(outcome) => panic!("expected a lookup ticket, got {outcome:?}"),
        }
    }

    #[test]
    fn test_rejects_bad_benchmark() {
        let err = BillState::new(Arc::new(NoOpPresenter), 0).err().unwrap();
        assert_eq!(err.code, ErrorCode::ConfigError);
    }

    #[test]
    fn test_no_bill_is_no_active_bill() {
        let state = state();
        assert_eq!(state.view().unwrap_err().code, ErrorCode::NoActiveBill);
        assert_eq!(state.begin_scan("111").unwrap_err().code, ErrorCode::NoActiveBill);
        assert_eq!(state.clear().unwrap_err().code, ErrorCode::NoActiveBill);
        assert_eq!(state.end().unwrap_err().code, ErrorCode::NoActiveBill);
    }

    #[test]
    fn test_scan_scenario() {
        let state = state();
        state.start().unwrap();

        assert!(matches!(scan(&state, "111").unwrap(), ScanOutcome::Added { .. }));
        assert!(matches!(scan(&state, "222").unwrap(), ScanOutcome::Added { .. }));

        let ScanOutcome::Incremented { item, view } = scan(&state, "111").unwrap() else {
            panic!("rescan should increment");
        };
        assert_eq!(item.quantity, 2);
        assert_eq!(view.totals.item_count, 3);
        assert_eq!(view.totals.total_carbon, 70);
        assert_eq!(view.totals.total_points, 115);
    }

    #[test]
    fn test_rescan_needs_no_lookup() {
        let state = state();
        state.start().unwrap();
        scan(&state, "111").unwrap();

        assert!(matches!(
            state.begin_scan("111").unwrap(),
            ScanStart::Done(ScanOutcome::Incremented { .. })
        ));
    }

    #[test]
    fn test_lookup_miss_leaves_bill_unchanged() {
        let state = state();
        state.start().unwrap();
        scan(&state, "111").unwrap();
        let before = state.view().unwrap();

        let err = scan(&state, "999").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(state.view().unwrap(), before);
    }

    #[test]
    fn test_lookup_after_start_is_discarded() {
        let state = state();
        state.start().unwrap();

        let pending = ticket(state.begin_scan("111").unwrap());
        let new_bill = state.start().unwrap();

        let outcome = state.complete_scan(pending, info("111")).unwrap();
        assert_eq!(
            outcome,
            ScanOutcome::Discarded {
                barcode: "111".into()
            }
        );
        assert_eq!(state.view().unwrap(), new_bill);
    }

    #[test]
    fn test_lookup_after_clear_is_discarded() {
        let state = state();
        state.start().unwrap();
        scan(&state, "222").unwrap();

        let pending = ticket(state.begin_scan("111").unwrap());
        state.clear().unwrap();

        assert!(matches!(
            state.complete_scan(pending, info("111")).unwrap(),
            ScanOutcome::Discarded { .. }
        ));
        assert!(state.with_bill(|b| b.is_empty()).unwrap());
    }

    #[test]
    fn test_stale_lookup_error_is_discarded_too() {
        let state = state();
        state.start().unwrap();

        let pending = ticket(state.begin_scan("999").unwrap());
        state.clear().unwrap();

        assert!(matches!(
            state.complete_scan(pending, info("999")).unwrap(),
            ScanOutcome::Discarded { .. }
        ));
    }

    #[test]
    fn test_overlapping_lookups_for_same_barcode_increment() {
        let state = state();
        state.start().unwrap();

        let first = ticket(state.begin_scan("111").unwrap());
        let second = ticket(state.begin_scan("111").unwrap());

        assert!(matches!(
            state.complete_scan(first, info("111")).unwrap(),
            ScanOutcome::Added { .. }
        ));
        let ScanOutcome::Incremented { item, .. } = state.complete_scan(second, info("111")).unwrap()
        else {
            panic!("second result should increment");
        };
        assert_eq!(item.quantity, 2);
        assert_eq!(state.with_bill(|b| b.items().len()).unwrap(), 1);
    }

    #[test]
    fn test_end_and_closed_bill() {
        let state = state();
        state.start().unwrap();
        assert_eq!(state.end().unwrap_err().code, ErrorCode::EmptyBill);

        scan(&state, "111").unwrap();
        let (summary, view) = state.end().unwrap();
        assert!(!view.active);
        assert_eq!(summary.summary.total_greenpoints, 50);

        assert_eq!(state.begin_scan("111").unwrap_err().code, ErrorCode::InactiveBill);
        assert_eq!(
            state.update_quantity("111", 1).unwrap_err().code,
            ErrorCode::InactiveBill
        );
        assert_eq!(state.end().unwrap_err().code, ErrorCode::InactiveBill);
    }

    #[test]
    fn test_lookup_in_flight_when_bill_ends_is_discarded() {
        let state = state();
        state.start().unwrap();
        scan(&state, "111").unwrap();

        let pending = ticket(state.begin_scan("222").unwrap());
        state.end().unwrap();

        assert!(matches!(
            state.complete_scan(pending, info("222")).unwrap(),
            ScanOutcome::Discarded { .. }
        ));
    }

    #[test]
    fn test_update_quantity_and_remove() {
        let state = state();
        state.start().unwrap();
        scan(&state, "111").unwrap();
        scan(&state, "222").unwrap();

        let (change, view) = state.update_quantity("222", -1).unwrap();
        assert_eq!(change, QuantityChange::Removed);
        assert_eq!(view.items.len(), 1);

        let (change, _) = state.update_quantity("999", 3).unwrap();
        assert_eq!(change, QuantityChange::NotInBill);

        let (removed, view) = state.remove("111").unwrap();
        assert!(removed);
        assert!(view.items.is_empty());
    }

    #[test]
    fn test_quantity_overflow_leaves_session_usable() {
        let state = state();
        state.start().unwrap();
        scan(&state, "111").unwrap();

        let err = state.update_quantity("111", i64::MAX).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        assert_eq!(state.view().unwrap().totals.item_count, 1);
        let (change, view) = state.update_quantity("111", -1).unwrap();
        assert_eq!(change, QuantityChange::Removed);
        assert!(view.items.is_empty());
    }

    #[test]
    fn test_closed_summary_requires_ended_bill() {
        let state = state();
        state.start().unwrap();
        scan(&state, "111").unwrap();

        assert_eq!(
            state.closed_summary().unwrap_err().code,
            ErrorCode::BillStillOpen
        );

        let (ended, _) = state.end().unwrap();
        let summary = state.closed_summary().unwrap();
        assert_eq!(summary, ended);
    }

    #[test]
    fn test_export_summary_open_bill() {
        let state = state();
        state.start().unwrap();
        assert_eq!(state.export_summary().unwrap_err().code, ErrorCode::EmptyBill);

        scan(&state, "222").unwrap();
        assert_eq!(state.export_summary().unwrap().summary.total_items, 1);
    }

    #[test]
    fn test_finish_only_resets_matching_bill() {
        let presenter = Arc::new(RecordingPresenter::default());
        let state = BillState::new(presenter.clone(), 50).unwrap();

        let view = state.start().unwrap();
        assert!(!state.finish("some-other-bill"));
        assert_eq!(*presenter.resets.lock().unwrap(), 0);

        assert!(state.finish(&view.bill_id));
        assert_eq!(*presenter.resets.lock().unwrap(), 1);
        assert_eq!(state.view().unwrap_err().code, ErrorCode::NoActiveBill);
    }

    #[test]
    fn test_presenter_sees_every_change() {
        let presenter = Arc::new(RecordingPresenter::default());
        let state = BillState::new(presenter.clone(), 50).unwrap();

        state.start().unwrap();
        scan(&state, "111").unwrap();
        scan(&state, "111").unwrap();
        state.update_quantity("111", -1).unwrap();
        let _ = scan(&state, "999");

        let views = presenter.views.lock().unwrap();
        let counts: Vec<i64> = views.iter().map(|v| v.totals.item_count).collect();
        assert_eq!(counts, vec![0, 1, 2, 1]);
    }
}
