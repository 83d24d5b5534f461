// Tests for the analysis response cache: TTL expiry and oldest-out
// eviction. Time is driven with tokio's paused clock.

use std::time::Duration;

use nutrivoice::analysis::{NutritionData, ResponseCache, TotalNutrition};

fn sample(calories: f64) -> NutritionData {
    NutritionData {
        food_items: Vec::new(),
        total_nutrition: TotalNutrition {
            calories,
            protein: 0.0,
            carbohydrates: 0.0,
            fat: 0.0,
        },
    }
}

#[tokio::test(start_paused = true)]
async fn test_fresh_entry_is_returned() {
    let cache = ResponseCache::default();

    cache.insert("grilled chicken".to_string(), sample(250.0)).await;

    let hit = cache.get("grilled chicken").await.unwrap();
    assert_eq!(hit.total_nutrition.calories, 250.0);
}

#[tokio::test(start_paused = true)]
async fn test_expired_entry_never_returned_but_still_present() {
    let cache = ResponseCache::default();

    cache.insert("oatmeal".to_string(), sample(150.0)).await;

    tokio::time::advance(Duration::from_secs(24 * 60 * 60 + 1)).await;

    assert!(cache.get("oatmeal").await.is_none());
    // Lazy expiry: the entry stays physically present until evicted
    assert_eq!(cache.len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_entry_just_inside_ttl_is_returned() {
    let cache = ResponseCache::default();

    cache.insert("banana".to_string(), sample(90.0)).await;

    tokio::time::advance(Duration::from_secs(24 * 60 * 60 - 1)).await;

    assert!(cache.get("banana").await.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_101st_insert_evicts_only_the_oldest() {
    let cache = ResponseCache::default();

    for i in 0..100 {
        cache.insert(format!("meal-{i}"), sample(i as f64)).await;
        tokio::time::advance(Duration::from_millis(1)).await;
    }
    assert_eq!(cache.len().await, 100);

    cache.insert("meal-100".to_string(), sample(100.0)).await;

    assert_eq!(cache.len().await, 100);
    assert!(cache.get("meal-0").await.is_none(), "oldest entry evicted");
    for i in 1..=100 {
        assert!(
            cache.get(&format!("meal-{i}")).await.is_some(),
            "meal-{i} should survive eviction"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_reinsert_refreshes_timestamp() {
    let cache = ResponseCache::new(Duration::from_secs(60), 100);

    cache.insert("soup".to_string(), sample(80.0)).await;
    tokio::time::advance(Duration::from_secs(50)).await;

    cache.insert("soup".to_string(), sample(85.0)).await;
    tokio::time::advance(Duration::from_secs(50)).await;

    // 100s after the first insert, but only 50s after the refresh
    let hit = cache.get("soup").await.unwrap();
    assert_eq!(hit.total_nutrition.calories, 85.0);
}

#[tokio::test(start_paused = true)]
async fn test_small_cache_eviction_order() {
    let cache = ResponseCache::new(Duration::from_secs(3600), 2);

    cache.insert("a".to_string(), sample(1.0)).await;
    tokio::time::advance(Duration::from_millis(1)).await;
    cache.insert("b".to_string(), sample(2.0)).await;
    tokio::time::advance(Duration::from_millis(1)).await;
    cache.insert("c".to_string(), sample(3.0)).await;

    assert_eq!(cache.len().await, 2);
    assert!(cache.get("a").await.is_none());
    assert!(cache.get("b").await.is_some());
    assert!(cache.get("c").await.is_some());
}
