//! End-to-end scenarios over an in-memory database: the consistency
//! rules the engine exists to enforce.

use chrono::{Duration, Utc};
use stocklane_core::{AlertType, MovementType, SaleLine};
use stocklane_db::{Database, DbConfig};
use stocklane_engine::{
    AdjustToQuantity, AlertService, AnalyticsService, BatchService, CheckoutService, CreateBatch,
    CreateProduct, CreateSale, CreateSupplier, EngineError, LedgerService, LinkProductToSupplier,
    ProductService, RecordMovement, SupplierService,
};

const USER: &str = "user-1";
const ACTOR: &str = "actor-1";

async fn setup() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

async fn seed_product(db: &Database, quantity: i64, low_stock_at: Option<i64>) -> String {
    let products = ProductService::new(db.clone());
    let product = products
        .create_product(
            USER,
            CreateProduct {
                name: "Brake Pad Set".to_string(),
                manufacturer: Some("Wagner".to_string()),
                model: None,
                sku: Some("BRK-0001".to_string()),
                quantity,
                low_stock_at,
                price_cents: 4500,
                category: Some("Brakes".to_string()),
                supplier: None,
                specs: None,
                compatibility: None,
                notes: None,
                image_url: None,
            },
        )
        .await
        .unwrap();
    product.id
}

fn out_movement(product_id: &str, quantity: i64) -> RecordMovement {
    RecordMovement {
        product_id: product_id.to_string(),
        movement_type: MovementType::Out,
        quantity,
        supplier_id: None,
        batch_id: None,
        unit_cost_cents: None,
        reference: None,
        reason: None,
        notes: None,
    }
}

fn sale_line(product_id: &str, quantity: i64, unit_price_cents: i64) -> SaleLine {
    SaleLine {
        product_id: product_id.to_string(),
        quantity,
        unit_price_cents,
        discount_cents: 0,
    }
}

// =============================================================================
// Ledger Scenarios
// =============================================================================

// Scenario: OUT movement crossing the low-stock threshold creates exactly
// one LOW_STOCK alert snapshotting the new quantity.
#[tokio::test]
async fn out_movement_crossing_threshold_alerts_once() {
    let db = setup().await;
    let product_id = seed_product(&db, 10, Some(5)).await;
    let ledger = LedgerService::new(db.clone());

    let movement = ledger
        .record_movement(USER, ACTOR, out_movement(&product_id, 6))
        .await
        .unwrap();

    assert_eq!(movement.previous_qty, 10);
    assert_eq!(movement.new_qty, 4);

    let product = db.products().find_by_id(USER, &product_id).await.unwrap().unwrap();
    assert_eq!(product.quantity, 4);

    let alerts = db.alerts().list_by_product(USER, &product_id).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, AlertType::LowStock);
    assert_eq!(alerts[0].current_value, Some(4));
    assert_eq!(alerts[0].threshold, Some(5));
}

// Scenario: an OUT movement that would drive quantity negative aborts with
// InsufficientStock and leaves no trace: quantity, ledger, and alerts all
// unchanged.
#[tokio::test]
async fn oversized_out_movement_leaves_no_trace() {
    let db = setup().await;
    let product_id = seed_product(&db, 10, Some(5)).await;
    let ledger = LedgerService::new(db.clone());

    let err = ledger
        .record_movement(USER, ACTOR, out_movement(&product_id, 11))
        .await
        .unwrap_err();

    match err {
        EngineError::InsufficientStock {
            available,
            requested,
            ..
        } => {
            assert_eq!(available, 10);
            assert_eq!(requested, 11);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    let product = db.products().find_by_id(USER, &product_id).await.unwrap().unwrap();
    assert_eq!(product.quantity, 10);
    assert!(db.movements().list_by_product(USER, &product_id).await.unwrap().is_empty());
    assert!(db.alerts().list_by_product(USER, &product_id).await.unwrap().is_empty());
}

// Scenario: a targeted adjustment to zero records the |new - previous|
// delta in the ledger row and raises OUT_OF_STOCK.
#[tokio::test]
async fn adjust_to_zero_records_delta_and_out_of_stock() {
    let db = setup().await;
    let product_id = seed_product(&db, 7, Some(3)).await;
    let ledger = LedgerService::new(db.clone());

    let movement = ledger
        .adjust_to_quantity(
            USER,
            ACTOR,
            AdjustToQuantity {
                product_id: product_id.clone(),
                new_quantity: 0,
                reason: Some("Shelf count".to_string()),
                notes: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(movement.movement_type, MovementType::Adjustment);
    assert_eq!(movement.quantity, 7);
    assert_eq!(movement.previous_qty, 7);
    assert_eq!(movement.new_qty, 0);

    let product = db.products().find_by_id(USER, &product_id).await.unwrap().unwrap();
    assert_eq!(product.quantity, 0);

    let alerts = db.alerts().list_by_product(USER, &product_id).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, AlertType::OutOfStock);
    assert_eq!(alerts[0].message, "Product is out of stock");
    assert_eq!(alerts[0].current_value, Some(0));
}

// A direct ADJUSTMENT movement treats quantity as the absolute target,
// unlike every other movement type.
#[tokio::test]
async fn direct_adjustment_is_absolute_target() {
    let db = setup().await;
    let product_id = seed_product(&db, 3, None).await;
    let ledger = LedgerService::new(db.clone());

    let movement = ledger
        .record_movement(
            USER,
            ACTOR,
            RecordMovement {
                movement_type: MovementType::Adjustment,
                quantity: 12,
                ..out_movement(&product_id, 0)
            },
        )
        .await
        .unwrap();

    assert_eq!(movement.previous_qty, 3);
    assert_eq!(movement.new_qty, 12);
    assert_eq!(movement.quantity, 12);

    let product = db.products().find_by_id(USER, &product_id).await.unwrap().unwrap();
    assert_eq!(product.quantity, 12);
}

// Ledger consistency: new - previous matches the signed effect of each
// movement type across a mixed sequence.
#[tokio::test]
async fn ledger_rows_are_consistent_with_movement_types() {
    let db = setup().await;
    let product_id = seed_product(&db, 0, None).await;
    let ledger = LedgerService::new(db.clone());

    let steps = [
        (MovementType::In, 20),
        (MovementType::Out, 5),
        (MovementType::Return, 2),
        (MovementType::Out, 8),
    ];
    for (movement_type, quantity) in steps {
        ledger
            .record_movement(
                USER,
                ACTOR,
                RecordMovement {
                    movement_type,
                    quantity,
                    ..out_movement(&product_id, 0)
                },
            )
            .await
            .unwrap();
    }

    let history = db.movements().list_by_product(USER, &product_id).await.unwrap();
    assert_eq!(history.len(), 4);

    for row in &history {
        let effect = row.new_qty - row.previous_qty;
        match row.movement_type {
            MovementType::In | MovementType::Return => assert_eq!(effect, row.quantity),
            MovementType::Out => assert_eq!(effect, -row.quantity),
            MovementType::Adjustment => assert_eq!(row.new_qty, row.quantity),
        }
    }

    let product = db.products().find_by_id(USER, &product_id).await.unwrap().unwrap();
    assert_eq!(product.quantity, 9);
}

// IN movements carry unit cost through to total cost.
#[tokio::test]
async fn inbound_movement_computes_total_cost() {
    let db = setup().await;
    let product_id = seed_product(&db, 0, None).await;
    let ledger = LedgerService::new(db.clone());

    let movement = ledger
        .record_movement(
            USER,
            ACTOR,
            RecordMovement {
                movement_type: MovementType::In,
                quantity: 24,
                unit_cost_cents: Some(350),
                ..out_movement(&product_id, 0)
            },
        )
        .await
        .unwrap();

    assert_eq!(movement.unit_cost_cents, Some(350));
    assert_eq!(movement.total_cost_cents, Some(8400));
}

// A unit cost whose total would overflow i64 is rejected as validation,
// with no ledger row and no quantity change.
#[tokio::test]
async fn overflowing_movement_cost_is_rejected() {
    let db = setup().await;
    let product_id = seed_product(&db, 0, None).await;
    let ledger = LedgerService::new(db.clone());

    let err = ledger
        .record_movement(
            USER,
            ACTOR,
            RecordMovement {
                movement_type: MovementType::In,
                quantity: 2,
                unit_cost_cents: Some(i64::MAX),
                ..out_movement(&product_id, 0)
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { .. }));

    let product = db.products().find_by_id(USER, &product_id).await.unwrap().unwrap();
    assert_eq!(product.quantity, 0);
    assert!(db.movements().list_by_product(USER, &product_id).await.unwrap().is_empty());
}

// Threshold crossings are never deduplicated: N qualifying movements
// produce N alert rows.
#[tokio::test]
async fn repeat_crossings_produce_repeat_alerts() {
    let db = setup().await;
    let product_id = seed_product(&db, 8, Some(5)).await;
    let ledger = LedgerService::new(db.clone());

    // 8 → 5 → 4 → 3: three movements at or below threshold
    for quantity in [3, 1, 1] {
        ledger
            .record_movement(USER, ACTOR, out_movement(&product_id, quantity))
            .await
            .unwrap();
    }

    let alerts = db.alerts().list_by_product(USER, &product_id).await.unwrap();
    assert_eq!(alerts.len(), 3);
    assert!(alerts.iter().all(|a| a.alert_type == AlertType::LowStock));
}

// A transaction abort after the ledger insert leaves no orphaned row and
// no quantity change.
#[tokio::test]
async fn aborted_transaction_leaves_no_orphans() {
    let db = setup().await;
    let product_id = seed_product(&db, 10, None).await;

    {
        let mut tx = db.pool().begin().await.unwrap();

        let movement = stocklane_core::StockMovement {
            id: "m-abort".to_string(),
            user_id: USER.to_string(),
            product_id: product_id.clone(),
            supplier_id: None,
            batch_id: None,
            movement_type: MovementType::Out,
            quantity: 4,
            previous_qty: 10,
            new_qty: 6,
            unit_cost_cents: None,
            total_cost_cents: None,
            reference: None,
            reason: None,
            notes: None,
            performed_by: ACTOR.to_string(),
            created_at: Utc::now(),
        };
        db.movements().insert_tx(&mut tx, &movement).await.unwrap();

        // fault injected between the ledger insert and the quantity swap
        tx.rollback().await.unwrap();
    }

    let product = db.products().find_by_id(USER, &product_id).await.unwrap().unwrap();
    assert_eq!(product.quantity, 10);
    assert!(db.movements().list_by_product(USER, &product_id).await.unwrap().is_empty());
}

// =============================================================================
// Checkout Scenarios
// =============================================================================

// Scenario: a sale whose second line has insufficient stock aborts whole,
// leaving the first line's product untouched and no sale behind.
#[tokio::test]
async fn partial_sale_aborts_whole() {
    let db = setup().await;
    let products = ProductService::new(db.clone());
    let checkout = CheckoutService::new(db.clone());

    let first = seed_product(&db, 10, None).await;
    let second = products
        .create_product(
            USER,
            CreateProduct {
                name: "Oil Filter".to_string(),
                manufacturer: None,
                model: None,
                sku: None,
                quantity: 1,
                low_stock_at: None,
                price_cents: 1200,
                category: None,
                supplier: None,
                specs: None,
                compatibility: None,
                notes: None,
                image_url: None,
            },
        )
        .await
        .unwrap()
        .id;

    let err = checkout
        .create_sale(
            USER,
            CreateSale {
                items: vec![sale_line(&first, 2, 4500), sale_line(&second, 3, 1200)],
                customer_name: None,
                customer_phone: None,
                payment_method: None,
                overall_discount_cents: None,
                tax_rate_bps: None,
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientStock { .. }));

    let p1 = db.products().find_by_id(USER, &first).await.unwrap().unwrap();
    let p2 = db.products().find_by_id(USER, &second).await.unwrap().unwrap();
    assert_eq!(p1.quantity, 10);
    assert_eq!(p2.quantity, 1);
    assert!(db.sales().list_by_user(USER, 10).await.unwrap().is_empty());
}

// Sequential sales on one day draw distinct, strictly increasing invoice
// suffixes.
#[tokio::test]
async fn invoice_numbers_increase_strictly() {
    let db = setup().await;
    let product_id = seed_product(&db, 100, None).await;
    let checkout = CheckoutService::new(db.clone());

    let mut invoices = Vec::new();
    for _ in 0..5 {
        let receipt = checkout
            .create_sale(
                USER,
                CreateSale {
                    items: vec![sale_line(&product_id, 1, 4500)],
                    customer_name: None,
                    customer_phone: None,
                    payment_method: None,
                    overall_discount_cents: None,
                    tax_rate_bps: None,
                    notes: None,
                },
            )
            .await
            .unwrap();
        invoices.push(receipt.invoice_number);
    }

    let day = Utc::now().format("%Y%m%d").to_string();
    for (i, invoice) in invoices.iter().enumerate() {
        assert_eq!(*invoice, format!("INV-{}-{:04}", day, i + 1));
    }
}

// A committed sale snapshots names and prices, decrements stock, and runs
// the threshold check per line.
#[tokio::test]
async fn sale_snapshots_and_decrements() {
    let db = setup().await;
    let product_id = seed_product(&db, 6, Some(5)).await;
    let checkout = CheckoutService::new(db.clone());

    let receipt = checkout
        .create_sale(
            USER,
            CreateSale {
                items: vec![sale_line(&product_id, 2, 4500)],
                customer_name: Some("Dana".to_string()),
                customer_phone: None,
                payment_method: Some("cash".to_string()),
                overall_discount_cents: Some(500),
                tax_rate_bps: Some(1000),
                notes: None,
            },
        )
        .await
        .unwrap();

    // 2 × $45.00 = $90.00, − $5.00 = $85.00, + 10% tax = $93.50
    assert_eq!(receipt.total_cents, 9350);

    let details = checkout.sale_details(USER, &receipt.sale_id).await.unwrap();
    assert_eq!(details.sale.invoice_number, receipt.invoice_number);
    assert_eq!(details.items.len(), 1);
    assert_eq!(details.items[0].product_name, "Brake Pad Set");
    assert_eq!(details.items[0].unit_price_cents, 4500);

    // decremented to 4, which is under the threshold of 5
    let product = db.products().find_by_id(USER, &product_id).await.unwrap().unwrap();
    assert_eq!(product.quantity, 4);

    let alerts = db.alerts().list_by_product(USER, &product_id).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, AlertType::LowStock);

    // sales do not write ledger rows
    assert!(db.movements().list_by_product(USER, &product_id).await.unwrap().is_empty());
}

// Scenario: the same product listed on two cart lines decrements by the
// sum, keeps one snapshot row per line, and alerts once.
#[tokio::test]
async fn duplicate_line_cart_decrements_the_sum() {
    let db = setup().await;
    let product_id = seed_product(&db, 10, Some(5)).await;
    let checkout = CheckoutService::new(db.clone());

    let receipt = checkout
        .create_sale(
            USER,
            CreateSale {
                items: vec![sale_line(&product_id, 3, 4500), sale_line(&product_id, 3, 4500)],
                customer_name: None,
                customer_phone: None,
                payment_method: None,
                overall_discount_cents: None,
                tax_rate_bps: None,
                notes: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(receipt.total_cents, 27000);

    let details = checkout.sale_details(USER, &receipt.sale_id).await.unwrap();
    assert_eq!(details.items.len(), 2);
    assert!(details.items.iter().all(|i| i.quantity == 3));

    // 10 − (3 + 3) = 4, one crossing of the threshold of 5
    let product = db.products().find_by_id(USER, &product_id).await.unwrap().unwrap();
    assert_eq!(product.quantity, 4);
    let alerts = db.alerts().list_by_product(USER, &product_id).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, AlertType::LowStock);
}

// Sufficiency is judged against the per-product sum: duplicate lines whose
// total exceeds stock abort with InsufficientStock and leave no trace.
#[tokio::test]
async fn duplicate_line_cart_over_stock_is_insufficient() {
    let db = setup().await;
    let product_id = seed_product(&db, 5, None).await;
    let checkout = CheckoutService::new(db.clone());

    let err = checkout
        .create_sale(
            USER,
            CreateSale {
                items: vec![sale_line(&product_id, 3, 4500), sale_line(&product_id, 3, 4500)],
                customer_name: None,
                customer_phone: None,
                payment_method: None,
                overall_discount_cents: None,
                tax_rate_bps: None,
                notes: None,
            },
        )
        .await
        .unwrap_err();

    match err {
        EngineError::InsufficientStock {
            available,
            requested,
            ..
        } => {
            assert_eq!(available, 5);
            assert_eq!(requested, 6);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    let product = db.products().find_by_id(USER, &product_id).await.unwrap().unwrap();
    assert_eq!(product.quantity, 5);
    assert!(db.sales().list_by_user(USER, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_cart_is_rejected() {
    let db = setup().await;
    let checkout = CheckoutService::new(db.clone());

    let err = checkout
        .create_sale(
            USER,
            CreateSale {
                items: vec![],
                customer_name: None,
                customer_phone: None,
                payment_method: None,
                overall_discount_cents: None,
                tax_rate_bps: None,
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { .. }));
}

// =============================================================================
// Batch / Expiry Scenarios
// =============================================================================

// Scenario: a batch created 20 days before its expiry alerts EXPIRING_SOON
// immediately, with the days remaining snapshotted.
#[tokio::test]
async fn batch_inside_window_alerts_on_creation() {
    let db = setup().await;
    let product_id = seed_product(&db, 10, None).await;
    let batches = BatchService::new(db.clone());

    let now = Utc::now();
    let created = batches
        .create_batch(
            USER,
            CreateBatch {
                product_id: product_id.clone(),
                batch_number: "LOT-77".to_string(),
                quantity: 30,
                manufactured_at: Some(now - Duration::days(120)),
                expires_at: Some(now + Duration::days(20)),
                received_at: None,
                notes: None,
            },
        )
        .await
        .unwrap();

    let alert = created.alert.expect("expected an expiry alert");
    assert_eq!(alert.alert_type, AlertType::ExpiringSoon);
    assert_eq!(alert.current_value, Some(20));
    assert_eq!(alert.message, "Batch LOT-77 expires in 20 days");
}

// A receipt logged after the fact keeps the caller's received_at instead
// of the insertion time.
#[tokio::test]
async fn batch_receipt_can_be_backdated() {
    let db = setup().await;
    let product_id = seed_product(&db, 10, None).await;
    let batches = BatchService::new(db.clone());

    let received = Utc::now() - Duration::days(10);
    let created = batches
        .create_batch(
            USER,
            CreateBatch {
                product_id: product_id.clone(),
                batch_number: "LOT-79".to_string(),
                quantity: 12,
                manufactured_at: None,
                expires_at: None,
                received_at: Some(received),
                notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(created.batch.received_at, received);

    let stored = db.batches().find_by_id(USER, &created.batch.id).await.unwrap().unwrap();
    assert_eq!(stored.received_at.timestamp(), received.timestamp());
}

#[tokio::test]
async fn batch_expiry_before_manufacture_is_rejected() {
    let db = setup().await;
    let product_id = seed_product(&db, 10, None).await;
    let batches = BatchService::new(db.clone());

    let now = Utc::now();
    let err = batches
        .create_batch(
            USER,
            CreateBatch {
                product_id,
                batch_number: "LOT-78".to_string(),
                quantity: 10,
                manufactured_at: Some(now),
                expires_at: Some(now - Duration::days(1)),
                received_at: None,
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { .. }));
}

// Repeated sweeps re-emit for every batch still inside the window.
#[tokio::test]
async fn expiry_sweep_reemits_without_dedup() {
    let db = setup().await;
    let product_id = seed_product(&db, 10, None).await;
    let batches = BatchService::new(db.clone());
    let alerts = AlertService::new(db.clone());

    let now = Utc::now();
    // far-future batch: no alert on creation, none from sweeps
    batches
        .create_batch(
            USER,
            CreateBatch {
                product_id: product_id.clone(),
                batch_number: "LOT-FAR".to_string(),
                quantity: 5,
                manufactured_at: None,
                expires_at: Some(now + Duration::days(200)),
                received_at: None,
                notes: None,
            },
        )
        .await
        .unwrap();
    // expired batch: one alert on creation, one more per sweep
    batches
        .create_batch(
            USER,
            CreateBatch {
                product_id: product_id.clone(),
                batch_number: "LOT-OLD".to_string(),
                quantity: 5,
                manufactured_at: None,
                expires_at: Some(now - Duration::days(3)),
                received_at: None,
                notes: None,
            },
        )
        .await
        .unwrap();

    let first = alerts.check_expiring_batches(USER).await.unwrap();
    let second = alerts.check_expiring_batches(USER).await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(first[0].alert_type, AlertType::Expired);

    // creation + two sweeps = three EXPIRED rows for the same batch
    let all = db.alerts().list_by_product(USER, &product_id).await.unwrap();
    assert_eq!(all.len(), 3);
}

// =============================================================================
// Alert Lifecycle
// =============================================================================

#[tokio::test]
async fn acknowledge_and_resolve_are_orthogonal() {
    let db = setup().await;
    let product_id = seed_product(&db, 10, Some(5)).await;
    let ledger = LedgerService::new(db.clone());
    let alerts = AlertService::new(db.clone());

    ledger
        .record_movement(USER, ACTOR, out_movement(&product_id, 6))
        .await
        .unwrap();

    let open = alerts.list_open(USER).await.unwrap();
    assert_eq!(open.len(), 1);
    let alert_id = open[0].id.clone();

    let resolved = alerts.resolve(USER, &alert_id).await.unwrap();
    assert!(resolved.resolved_at.is_some());
    assert!(!resolved.acknowledged);

    let acked = alerts.acknowledge(USER, &alert_id, ACTOR).await.unwrap();
    assert!(acked.acknowledged);
    assert_eq!(acked.acknowledged_by.as_deref(), Some(ACTOR));

    assert_eq!(alerts.unacknowledged_count(USER).await.unwrap(), 0);
    assert!(alerts.list_open(USER).await.unwrap().is_empty());
}

#[tokio::test]
async fn acknowledging_missing_alert_is_not_found() {
    let db = setup().await;
    let alerts = AlertService::new(db.clone());

    let err = alerts.acknowledge(USER, "missing", ACTOR).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
}

// =============================================================================
// Authorization / Scoping
// =============================================================================

#[tokio::test]
async fn blank_user_is_unauthorized_everywhere() {
    let db = setup().await;
    let ledger = LedgerService::new(db.clone());
    let checkout = CheckoutService::new(db.clone());
    let alerts = AlertService::new(db.clone());

    let err = ledger
        .record_movement("", ACTOR, out_movement("p-1", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized { .. }));

    let err = checkout
        .create_sale(
            " ",
            CreateSale {
                items: vec![sale_line("p-1", 1, 100)],
                customer_name: None,
                customer_phone: None,
                payment_method: None,
                overall_discount_cents: None,
                tax_rate_bps: None,
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized { .. }));

    let err = alerts.check_expiring_batches("").await.unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized { .. }));
}

#[tokio::test]
async fn operations_are_scoped_to_the_owner() {
    let db = setup().await;
    let product_id = seed_product(&db, 10, None).await;
    let ledger = LedgerService::new(db.clone());

    let err = ledger
        .record_movement("intruder", ACTOR, out_movement(&product_id, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));

    let product = db.products().find_by_id(USER, &product_id).await.unwrap().unwrap();
    assert_eq!(product.quantity, 10);
}

// =============================================================================
// Suppliers
// =============================================================================

#[tokio::test]
async fn primary_link_flip_is_atomic_per_product() {
    let db = setup().await;
    let product_id = seed_product(&db, 10, None).await;
    let suppliers = SupplierService::new(db.clone());

    let make = |name: &str| CreateSupplier {
        name: name.to_string(),
        contact_name: None,
        email: None,
        phone: None,
        address: None,
        notes: None,
    };
    let a = suppliers.create_supplier(USER, make("Apex Auto Supply")).await.unwrap();
    let b = suppliers.create_supplier(USER, make("Midland Parts Co")).await.unwrap();

    let link = |supplier_id: &str| LinkProductToSupplier {
        product_id: product_id.clone(),
        supplier_id: supplier_id.to_string(),
        supplier_sku: None,
        cost_price_cents: 2000,
        lead_time_days: Some(5),
        min_order_qty: None,
        is_primary: true,
    };
    suppliers.link_product_to_supplier(USER, link(&a.id)).await.unwrap();
    suppliers.link_product_to_supplier(USER, link(&b.id)).await.unwrap();

    let links = suppliers.links_for_product(USER, &product_id).await.unwrap();
    assert_eq!(links.len(), 2);
    let primaries: Vec<_> = links.iter().filter(|l| l.is_primary).collect();
    assert_eq!(primaries.len(), 1);
    assert_eq!(primaries[0].supplier_id, b.id);

    suppliers
        .unlink_product_from_supplier(USER, &product_id, &a.id)
        .await
        .unwrap();
    assert_eq!(suppliers.links_for_product(USER, &product_id).await.unwrap().len(), 1);
}

// =============================================================================
// Analytics
// =============================================================================

#[tokio::test]
async fn rollups_reflect_activity() {
    let db = setup().await;
    let product_id = seed_product(&db, 20, Some(5)).await;
    let ledger = LedgerService::new(db.clone());
    let checkout = CheckoutService::new(db.clone());
    let analytics = AnalyticsService::new(db.clone());

    ledger
        .record_movement(USER, ACTOR, out_movement(&product_id, 4))
        .await
        .unwrap();
    checkout
        .create_sale(
            USER,
            CreateSale {
                items: vec![sale_line(&product_id, 2, 4500)],
                customer_name: None,
                customer_phone: None,
                payment_method: None,
                overall_discount_cents: None,
                tax_rate_bps: None,
                notes: None,
            },
        )
        .await
        .unwrap();

    let summary = analytics.inventory_summary(USER).await.unwrap();
    assert_eq!(summary.total_products, 1);
    assert_eq!(summary.total_units, 14);
    assert_eq!(summary.stock_value_cents, 14 * 4500);

    let from = Utc::now() - Duration::hours(1);
    let to = Utc::now() + Duration::hours(1);

    let totals = analytics.movement_totals(USER, from, to).await.unwrap();
    assert_eq!(totals.len(), 1);
    assert_eq!(totals[0].movement_type, MovementType::Out);
    assert_eq!(totals[0].total_quantity, 4);

    let sales = analytics.sales_summary(USER, from, to).await.unwrap();
    assert_eq!(sales.sale_count, 1);
    assert_eq!(sales.revenue_cents, 9000);

    let top = analytics.top_sellers(USER, from, to, 5).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].total_quantity, 2);
}
