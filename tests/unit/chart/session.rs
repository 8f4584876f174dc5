//! Unit tests for chart session state

use std::sync::Arc;

use findscan::chart::{ChartError, ChartSession, SharedChart};
use findscan::indicators::volatility::calculate_bollinger_bands;
use findscan::models::indicators::{Bar, BollingerConfig};
use findscan::models::style::BollingerStyles;
use findscan::series::Series;

fn create_test_series(count: usize) -> Series {
    let bars = (0..count)
        .map(|i| {
            let price = 100.0 + (i as f64 * 0.5).sin() * 3.0;
            Bar::new(i as i64 * 60, price, price + 1.0, price - 1.0, price, 500.0)
        })
        .collect();
    Series::load(bars).unwrap()
}

fn create_session() -> ChartSession {
    ChartSession::new(
        create_test_series(50),
        BollingerConfig::default(),
        BollingerStyles::default(),
    )
    .unwrap()
}

#[test]
fn test_new_session_computes_bands() {
    let session = create_session();
    assert_eq!(session.generation(), 0);
    assert_eq!(session.bands().len(), 50);
    assert!(session.bands()[18].is_none());
    assert!(session.bands()[19].is_some());
}

#[test]
fn test_new_session_rejects_invalid_inputs() {
    let result = ChartSession::new(
        create_test_series(5),
        BollingerConfig::new(0, 2.0),
        BollingerStyles::default(),
    );
    assert!(matches!(result, Err(ChartError::Indicator(_))));
}

#[test]
fn test_apply_inputs_recomputes() {
    let mut session = create_session();
    let inputs = BollingerConfig::new(5, 1.0).with_offset(2);
    session.apply_inputs(inputs).unwrap();

    let expected = calculate_bollinger_bands(session.series().bars(), &inputs).unwrap();
    assert_eq!(session.inputs(), &inputs);
    assert_eq!(&*session.bands(), expected.as_slice());
    assert_eq!(session.generation(), 1);
}

#[test]
fn test_invalid_inputs_keep_previous_state() {
    let mut session = create_session();
    let before = session.bands();

    assert!(session.apply_inputs(BollingerConfig::new(0, 2.0)).is_err());
    assert!(session.apply_inputs(BollingerConfig::new(10, -2.0)).is_err());

    assert_eq!(session.inputs(), &BollingerConfig::default());
    assert!(Arc::ptr_eq(&before, &session.bands()));
    assert_eq!(session.generation(), 0);
}

#[test]
fn test_invalid_styles_keep_previous_styles() {
    let mut session = create_session();
    let mut styles = BollingerStyles::default();
    styles.background.opacity = -0.1;

    assert!(session.set_styles(styles).is_err());
    assert_eq!(session.styles(), &BollingerStyles::default());
}

#[test]
fn test_stale_commit_is_discarded() {
    let mut session = create_session();
    let newer = BollingerConfig::new(7, 2.0);
    let older = BollingerConfig::new(3, 2.0);
    let bars = session.series().bars().to_vec();

    let newer_bands = calculate_bollinger_bands(&bars, &newer).unwrap();
    let older_bands = calculate_bollinger_bands(&bars, &older).unwrap();

    assert!(session.commit(2, newer, newer_bands.into()));
    assert!(!session.commit(1, older, older_bands.into()));
    assert_eq!(session.inputs(), &newer);
    assert_eq!(session.generation(), 2);
}

#[test]
fn test_snapshot_reflects_session() {
    let mut session = create_session();
    session.set_enabled(true);
    let snapshot = session.snapshot();
    assert!(snapshot.enabled);
    assert_eq!(snapshot.bars, 50);
    assert_eq!(snapshot.inputs, BollingerConfig::default());

    let overlay = snapshot.overlay.unwrap();
    assert_eq!(overlay.points.len(), 50);
    assert_eq!(overlay.figures.len(), 3);
}

#[test]
fn test_overlay_hidden_until_indicator_added() {
    let mut session = create_session();
    assert!(!session.is_enabled());
    assert!(session.snapshot().overlay.is_none());

    session.set_enabled(true);
    assert!(session.snapshot().overlay.is_some());

    session.set_enabled(false);
    let snapshot = session.snapshot();
    assert!(!snapshot.enabled);
    assert!(snapshot.overlay.is_none());
    assert_eq!(session.bands().len(), 50);
}

#[test]
fn test_edits_while_disabled_are_kept() {
    let mut session = create_session();
    let inputs = BollingerConfig::new(9, 1.0);
    session.apply_inputs(inputs).unwrap();
    session.set_enabled(true);

    let overlay = session.snapshot().overlay.unwrap();
    assert_eq!(overlay.calc_params, (9, 1.0));
}

#[tokio::test]
async fn test_shared_chart_update_inputs() {
    let chart = SharedChart::new(create_session());

    let applied = chart
        .update_inputs(BollingerConfig::new(10, 1.5))
        .await
        .unwrap();
    assert!(applied);

    let applied = chart
        .update_inputs(BollingerConfig::new(4, 2.0).with_offset(-1))
        .await
        .unwrap();
    assert!(applied);

    let snapshot = chart.snapshot().await;
    assert_eq!(snapshot.inputs, BollingerConfig::new(4, 2.0).with_offset(-1));
    assert_eq!(snapshot.generation, 2);
}

#[tokio::test]
async fn test_shared_chart_rejects_invalid_inputs() {
    let chart = SharedChart::new(create_session());
    let result = chart.update_inputs(BollingerConfig::new(0, 2.0)).await;
    assert!(matches!(result, Err(ChartError::Indicator(_))));

    let snapshot = chart.snapshot().await;
    assert_eq!(snapshot.inputs, BollingerConfig::default());
    assert_eq!(snapshot.generation, 0);
}

#[tokio::test]
async fn test_shared_chart_concurrent_updates_keep_a_consistent_result() {
    let chart = Arc::new(SharedChart::new(create_session()));

    let mut handles = Vec::new();
    for length in 2..12 {
        let chart = chart.clone();
        handles.push(tokio::spawn(async move {
            chart.update_inputs(BollingerConfig::new(length, 2.0)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let snapshot = chart.snapshot().await;
    let series = chart.series().await;
    let expected = calculate_bollinger_bands(series.bars(), &snapshot.inputs).unwrap();
    assert_eq!(&*chart.bands().await, expected.as_slice());
    assert_eq!(snapshot.generation, 10);
}

#[tokio::test]
async fn test_shared_chart_later_issue_wins_when_finishing_first() {
    let chart = SharedChart::new(create_session());
    let older = chart.issue(BollingerConfig::new(3, 1.0)).unwrap();
    let newer = chart.issue(BollingerConfig::new(8, 2.5)).unwrap();
    assert!(older.generation() < newer.generation());

    assert!(chart.complete(newer).await.unwrap());
    assert!(!chart.complete(older).await.unwrap());

    let snapshot = chart.snapshot().await;
    let series = chart.series().await;
    let expected = calculate_bollinger_bands(series.bars(), newer.inputs()).unwrap();
    assert_eq!(snapshot.inputs, BollingerConfig::new(8, 2.5));
    assert_eq!(snapshot.generation, newer.generation());
    assert_eq!(&*chart.bands().await, expected.as_slice());
}

#[tokio::test]
async fn test_shared_chart_completions_in_reverse_order_keep_last_issued() {
    let chart = Arc::new(SharedChart::new(create_session()));
    let pending: Vec<_> = (2..12)
        .map(|length| chart.issue(BollingerConfig::new(length, 2.0)).unwrap())
        .collect();

    let mut handles = Vec::new();
    for update in pending.into_iter().rev() {
        let chart = chart.clone();
        handles.push(tokio::spawn(async move { chart.complete(update).await }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let snapshot = chart.snapshot().await;
    assert_eq!(snapshot.inputs, BollingerConfig::new(11, 2.0));
    assert_eq!(snapshot.generation, 10);
}

#[tokio::test]
async fn test_shared_chart_toggle_indicator() {
    let chart = SharedChart::new(create_session());
    assert!(chart.snapshot().await.overlay.is_none());

    chart.set_enabled(true).await;
    let snapshot = chart.snapshot().await;
    assert!(snapshot.enabled);
    assert_eq!(snapshot.overlay.unwrap().points.len(), 50);
}

#[tokio::test]
async fn test_shared_chart_update_styles() {
    let chart = SharedChart::new(create_session());
    let mut styles = BollingerStyles::default();
    styles.lower.display = false;

    chart.update_styles(styles.clone()).await.unwrap();
    assert_eq!(chart.snapshot().await.styles, styles);

    styles.lower.width = 99;
    assert!(matches!(
        chart.update_styles(styles).await,
        Err(ChartError::Style(_))
    ));
}
