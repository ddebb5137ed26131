//! End-to-end pipeline tests with a scripted fetcher.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{Reply, ScriptedFetcher};
use imagery::{plan_tiles, Mode, PipelineConfig, PixelPipeline, TileGridPosition};
use terrain_common::{Coordinate, PixelError};
use test_utils::{fixtures::places, GRID_COLORS};

fn san_francisco() -> Coordinate {
    let (lat, lon) = places::SAN_FRANCISCO;
    Coordinate::new(lat, lon)
}

fn small_config() -> PipelineConfig {
    PipelineConfig {
        tile_size: 30,
        output_resolution: 9,
    }
}

fn pipeline(fetcher: Arc<ScriptedFetcher>, config: PipelineConfig) -> PixelPipeline {
    PixelPipeline::new(fetcher, config)
}

// ============================================================================
// SINGLE mode
// ============================================================================

#[tokio::test]
async fn test_single_mode_returns_full_matrix() {
    let fetcher = Arc::new(ScriptedFetcher::solid([12, 34, 56]));
    let matrix = pipeline(fetcher.clone(), PipelineConfig::default())
        .run(san_francisco(), 0.02, Mode::Single)
        .await
        .unwrap();

    assert_eq!(matrix.len(), 160_000);
    assert_eq!(matrix.resolution(), 400);
    assert!(matrix.pixels().iter().all(|p| *p == [12, 34, 56]));

    let calls = fetcher.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, 800);
    assert!(calls[0].0.contains_point(places::SAN_FRANCISCO.1, places::SAN_FRANCISCO.0));
}

#[tokio::test]
async fn test_single_mode_accepts_any_tile_size() {
    let fetcher = Arc::new(ScriptedFetcher::new(Reply::Sized(7, [1, 2, 3])));
    let matrix = pipeline(fetcher, small_config())
        .run(san_francisco(), 0.08, Mode::Single)
        .await
        .unwrap();
    assert_eq!(matrix.len(), 81);
}

#[tokio::test]
async fn test_single_mode_box_is_deterministic() {
    let fetcher = Arc::new(ScriptedFetcher::solid([0, 0, 0]));
    let pipeline = pipeline(fetcher.clone(), small_config());

    pipeline.run(san_francisco(), 0.2, Mode::Single).await.unwrap();
    pipeline.run(san_francisco(), 0.2, Mode::Single).await.unwrap();

    let calls = fetcher.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0, calls[1].0);
}

// ============================================================================
// GRID3x3 mode
// ============================================================================

#[tokio::test]
async fn test_grid_mode_places_north_tiles_on_top() {
    let offset = 0.0035;
    let fetcher = Arc::new(ScriptedFetcher::grid_colors(san_francisco(), offset));
    let matrix = pipeline(fetcher.clone(), small_config())
        .run(san_francisco(), offset, Mode::Grid3x3)
        .await
        .unwrap();

    assert_eq!(matrix.len(), 81);
    // 9×9 output over a 90×90 mosaic: each third is 3 output pixels
    for position in TileGridPosition::all() {
        let expected = GRID_COLORS[position.index()];
        let x0 = position.col_band() * 3;
        let y0 = position.row_band() * 3;
        for y in y0..y0 + 3 {
            for x in x0..x0 + 3 {
                assert_eq!(
                    matrix.get(x, y),
                    Some(expected),
                    "dy={} dx={} at ({}, {})",
                    position.dy,
                    position.dx,
                    x,
                    y
                );
            }
        }
    }

    // dy=+1 in the top third, dy=-1 in the bottom third
    assert_eq!(matrix.get(4, 0), Some(GRID_COLORS[7]));
    assert_eq!(matrix.get(4, 8), Some(GRID_COLORS[1]));
    assert_eq!(fetcher.calls().len(), 9);
}

#[tokio::test]
async fn test_grid_mode_fetches_concurrently() {
    let offset = 0.0035;
    let fetcher = Arc::new(
        ScriptedFetcher::grid_colors(san_francisco(), offset).with_delay(Duration::from_millis(100)),
    );
    let start = Instant::now();
    pipeline(fetcher.clone(), small_config())
        .run(san_francisco(), offset, Mode::Grid3x3)
        .await
        .unwrap();

    assert_eq!(fetcher.max_in_flight(), 9);
    assert!(start.elapsed() < Duration::from_millis(800));
}

#[tokio::test]
async fn test_grid_failure_returns_error_without_waiting_for_siblings() {
    let offset = 0.0035;
    let plan = plan_tiles(san_francisco(), offset, Mode::Grid3x3).unwrap();

    let mut fetcher = ScriptedFetcher::new(Reply::Slow(Duration::from_secs(10), [0, 0, 0]));
    fetcher = fetcher.reply(
        &plan[0].1,
        Reply::Fail(PixelError::Fetch {
            status: 500,
            provider_message: "Error exporting map".to_string(),
        }),
    );
    let fetcher = Arc::new(fetcher);

    let start = Instant::now();
    let result = pipeline(fetcher, small_config())
        .run(san_francisco(), offset, Mode::Grid3x3)
        .await;

    assert!(start.elapsed() < Duration::from_secs(5));
    match result {
        Err(PixelError::Fetch { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected fetch error, got {:?}", other.map(|m| m.len())),
    }
}

#[tokio::test]
async fn test_grid_tile_size_mismatch() {
    let offset = 0.0035;
    let plan = plan_tiles(san_francisco(), offset, Mode::Grid3x3).unwrap();
    let fetcher = Arc::new(ScriptedFetcher::solid([5, 5, 5]).reply(&plan[4].1, Reply::Sized(29, [1, 1, 1])));

    let err = pipeline(fetcher, small_config())
        .run(san_francisco(), offset, Mode::Grid3x3)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        PixelError::TileSizeMismatch {
            index: 4,
            expected: 30,
            width: 29,
            height: 29,
        }
    );
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_out_of_range_center_never_fetches() {
    let fetcher = Arc::new(ScriptedFetcher::solid([0, 0, 0]));
    let pipeline = pipeline(fetcher.clone(), small_config());

    let err = pipeline
        .run(Coordinate::new(91.0, 0.0), 0.02, Mode::Single)
        .await
        .unwrap_err();
    assert!(matches!(err, PixelError::Validation(_)));

    let err = pipeline
        .run(Coordinate::new(90.0, 0.0), 0.02, Mode::Single)
        .await
        .unwrap_err();
    assert!(matches!(err, PixelError::InvalidCoordinate(_)));

    assert!(fetcher.calls().is_empty());
}

#[test]
fn test_plan_matches_free_function() {
    let fetcher = Arc::new(ScriptedFetcher::solid([0, 0, 0]));
    let pipeline = pipeline(fetcher, small_config());
    assert_eq!(
        pipeline.plan(san_francisco(), 0.0035, Mode::Grid3x3).unwrap(),
        plan_tiles(san_francisco(), 0.0035, Mode::Grid3x3).unwrap()
    );
}
