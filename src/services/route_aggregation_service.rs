//! Route Aggregation Service
//!
//! Computes the travel route of an itinerary at three levels: the leg between each pair
//! of consecutive activities in a day, the day, and the whole trip.
//!
//! ## Policy
//! - Array order inside a day is visitation order.
//! - Every allowed transport mode is queried once per leg, in the order stored on the
//!   itinerary. The mode with the strictly smallest duration wins, so ties keep the
//!   earliest mode.
//! - A mode whose call fails or returns no route is left out of the comparison. A leg
//!   without any usable mode gets no route and adds nothing to the totals; the rest of
//!   the trip is still computed.
//! - Totals are rebuilt from scratch on every pass.
//!
//! The aggregation itself is pure: [`RouteAggregationService::aggregate_trip`] returns a
//! [`TripResult`] and only [`TripResult::apply_to`] touches an itinerary.

use std::sync::Arc;

use crate::models::itinerary::{
    Activity, Day, DayRoute, DaySummary, Itinerary, RouteLeg, TransportMode, TripRoute,
};
use crate::services::directions_service::{DirectionsOutcome, DirectionsProvider, UsableRoute};

/// Meters below one kilometre are shown whole, everything else in km with one decimal.
pub fn format_distance(meters: u64) -> String {
    if meters < 1000 {
        format!("{} m", meters)
    } else {
        format!("{:.1} km", meters as f64 / 1000.0)
    }
}

/// Whole hours and whole remaining minutes; seconds are dropped.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;

    if hours > 0 {
        format!("{} h {} min", hours, minutes)
    } else {
        format!("{} min", minutes)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedAttempt {
    pub mode: TransportMode,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegResult {
    pub from_activity: String,
    pub to_activity: String,
    pub route: Option<RouteLeg>,
    pub failed_attempts: Vec<FailedAttempt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayResult {
    pub day_id: String,
    pub date: String,
    /// One entry per adjacent activity pair, in visitation order.
    pub legs: Vec<LegResult>,
    pub distance_meters: u64,
    pub duration_seconds: u64,
}

impl DayResult {
    pub fn day_route(&self) -> DayRoute {
        DayRoute {
            total_distance: format_distance(self.distance_meters),
            total_duration: format_duration(self.duration_seconds),
            distance_meters: self.distance_meters,
            duration_seconds: self.duration_seconds,
            segments: self.legs.iter().filter_map(|leg| leg.route.clone()).collect(),
        }
    }

    fn summary(&self) -> DaySummary {
        DaySummary {
            day_id: self.day_id.clone(),
            date: self.date.clone(),
            total_distance: format_distance(self.distance_meters),
            total_duration: format_duration(self.duration_seconds),
        }
    }
}

/// A leg no allowed mode could route.
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedLeg {
    pub day_index: usize,
    pub from_activity: String,
    pub to_activity: String,
    pub failed_attempts: Vec<FailedAttempt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripResult {
    pub days: Vec<DayResult>,
    pub distance_meters: u64,
    pub duration_seconds: u64,
}

impl TripResult {
    pub fn trip_route(&self) -> TripRoute {
        TripRoute {
            total_distance: format_distance(self.distance_meters),
            total_duration: format_duration(self.duration_seconds),
            distance_meters: self.distance_meters,
            duration_seconds: self.duration_seconds,
            days: self.days.iter().map(DayResult::summary).collect(),
        }
    }

    pub fn unresolved_legs(&self) -> Vec<UnresolvedLeg> {
        self.days
            .iter()
            .enumerate()
            .flat_map(|(day_index, day)| {
                day.legs
                    .iter()
                    .filter(|leg| leg.route.is_none())
                    .map(move |leg| UnresolvedLeg {
                        day_index,
                        from_activity: leg.from_activity.clone(),
                        to_activity: leg.to_activity.clone(),
                        failed_attempts: leg.failed_attempts.clone(),
                    })
            })
            .collect()
    }

    /// Write the computed routes onto the itinerary this result was computed from.
    /// Previous routes are replaced, including on legs that no longer resolve.
    pub fn apply_to(&self, itinerary: &mut Itinerary) {
        for (day, result) in itinerary.days.iter_mut().zip(&self.days) {
            for (index, activity) in day.activities.iter_mut().enumerate() {
                activity.route_to_next = result
                    .legs
                    .get(index)
                    .and_then(|leg| leg.route.clone());
            }
            day.day_route = Some(result.day_route());
        }
        itinerary.complete_route = Some(self.trip_route());
    }
}

pub struct RouteAggregationService {
    directions: Arc<dyn DirectionsProvider>,
}

impl RouteAggregationService {
    pub fn new(directions: Arc<dyn DirectionsProvider>) -> Self {
        Self { directions }
    }

    /// Fastest usable route between two activities among `modes`.
    pub async fn aggregate_leg(
        &self,
        from: &Activity,
        to: &Activity,
        modes: &[TransportMode],
    ) -> LegResult {
        let mut best: Option<(TransportMode, UsableRoute)> = None;
        let mut failed_attempts = Vec::new();

        for mode in distinct_modes(modes) {
            match self
                .directions
                .route(from.poi.location, to.poi.location, mode)
                .await
            {
                Ok(DirectionsOutcome::Usable(route)) => {
                    let faster = best
                        .as_ref()
                        .map_or(true, |(_, current)| route.duration_seconds < current.duration_seconds);
                    if faster {
                        best = Some((mode, route));
                    }
                }
                Ok(DirectionsOutcome::NoRoute) => {
                    failed_attempts.push(FailedAttempt {
                        mode,
                        reason: "no route".to_string(),
                    });
                }
                Err(err) => {
                    failed_attempts.push(FailedAttempt {
                        mode,
                        reason: err.to_string(),
                    });
                }
            }
        }

        let route = best.map(|(mode, route)| RouteLeg {
            distance: format_distance(route.distance_meters),
            duration: format_duration(route.duration_seconds),
            mode,
            distance_meters: route.distance_meters,
            duration_seconds: route.duration_seconds,
            full_route: route.raw_payload,
        });

        LegResult {
            from_activity: from.id.clone(),
            to_activity: to.id.clone(),
            route,
            failed_attempts,
        }
    }

    pub async fn aggregate_day(&self, day: &Day, modes: &[TransportMode]) -> DayResult {
        let mut legs = Vec::with_capacity(day.activities.len().saturating_sub(1));
        let mut distance_meters = 0;
        let mut duration_seconds = 0;

        for pair in day.activities.windows(2) {
            let leg = self.aggregate_leg(&pair[0], &pair[1], modes).await;

            match &leg.route {
                Some(route) => {
                    distance_meters += route.distance_meters;
                    duration_seconds += route.duration_seconds;
                }
                None => {
                    log::warn!(
                        "No route from activity {} to {} on {} (tried: {})",
                        leg.from_activity,
                        leg.to_activity,
                        day.date,
                        describe_attempts(&leg.failed_attempts)
                    );
                }
            }
            legs.push(leg);
        }

        DayResult {
            day_id: day.id.clone(),
            date: day.date.clone(),
            legs,
            distance_meters,
            duration_seconds,
        }
    }

    pub async fn aggregate_trip(&self, days: &[Day], modes: &[TransportMode]) -> TripResult {
        let mut results = Vec::with_capacity(days.len());
        let mut distance_meters = 0;
        let mut duration_seconds = 0;

        for day in days {
            let result = self.aggregate_day(day, modes).await;
            distance_meters += result.distance_meters;
            duration_seconds += result.duration_seconds;
            results.push(result);
        }

        log::info!(
            "Aggregated {} days: {} over {}",
            results.len(),
            format_distance(distance_meters),
            format_duration(duration_seconds)
        );

        TripResult {
            days: results,
            distance_meters,
            duration_seconds,
        }
    }

    /// Aggregate with the itinerary's own transport modes and write the result back onto it.
    pub async fn recompute(&self, itinerary: &mut Itinerary) -> TripResult {
        let result = self
            .aggregate_trip(&itinerary.days, &itinerary.transport_modes)
            .await;
        result.apply_to(itinerary);
        result
    }
}

/// Stored order with repeats removed, so each mode is queried once per leg.
fn distinct_modes(modes: &[TransportMode]) -> Vec<TransportMode> {
    let mut distinct = Vec::with_capacity(modes.len());
    for mode in modes {
        if !distinct.contains(mode) {
            distinct.push(*mode);
        }
    }
    distinct
}

fn describe_attempts(attempts: &[FailedAttempt]) -> String {
    if attempts.is_empty() {
        return "no modes".to_string();
    }
    attempts
        .iter()
        .map(|attempt| format!("{}: {}", attempt.mode, attempt.reason))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::poi::{GeoPoint, Poi, PoiId};
    use crate::services::directions_service::DirectionsError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Clone)]
    enum Scripted {
        Route { seconds: u64, meters: u64 },
        NoRoute,
        Fail,
    }

    /// Directions double keyed by (origin latitude, destination latitude, mode).
    /// Pairs that were not scripted have no route.
    #[derive(Default)]
    struct ScriptedDirections {
        answers: HashMap<(u64, u64, TransportMode), Scripted>,
        calls: Mutex<Vec<(u64, u64, TransportMode)>>,
    }

    impl ScriptedDirections {
        fn answer(mut self, from: f64, to: f64, mode: TransportMode, answer: Scripted) -> Self {
            self.answers
                .insert((from.to_bits(), to.to_bits(), mode), answer);
            self
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl DirectionsProvider for ScriptedDirections {
        async fn route(
            &self,
            origin: GeoPoint,
            destination: GeoPoint,
            mode: TransportMode,
        ) -> Result<DirectionsOutcome, DirectionsError> {
            let key = (origin.lat.to_bits(), destination.lat.to_bits(), mode);
            self.calls.lock().unwrap().push(key);

            match self.answers.get(&key).cloned().unwrap_or(Scripted::NoRoute) {
                Scripted::Route { seconds, meters } => {
                    Ok(DirectionsOutcome::Usable(UsableRoute {
                        distance_meters: meters,
                        duration_seconds: seconds,
                        display_distance: format!("{} m", meters),
                        display_duration: format!("{} s", seconds),
                        raw_payload: json!({ "mode": mode.as_str(), "seconds": seconds }),
                    }))
                }
                Scripted::NoRoute => Ok(DirectionsOutcome::NoRoute),
                Scripted::Fail => Err(DirectionsError::Status(503)),
            }
        }
    }

    fn activity(id: &str, lat: f64) -> Activity {
        Activity {
            id: id.to_string(),
            poi: Poi {
                id: PoiId::Text(id.to_string()),
                name: id.to_string(),
                description: String::new(),
                category: None,
                image_url: None,
                location: GeoPoint::new(lat, 2.0),
                address: None,
                external_id: None,
                source: None,
            },
            start_time: "09:00".to_string(),
            end_time: "10:00".to_string(),
            notes: None,
            route_to_next: None,
        }
    }

    fn day(id: &str, activities: Vec<Activity>) -> Day {
        Day {
            id: id.to_string(),
            date: "2025-06-01".to_string(),
            activities,
            day_route: None,
        }
    }

    fn itinerary(days: Vec<Day>, modes: Vec<TransportMode>) -> Itinerary {
        Itinerary {
            id: None,
            name: "Trip".to_string(),
            description: String::new(),
            destination: "Barcelona".to_string(),
            start_date: "2025-06-01".to_string(),
            end_date: "2025-06-02".to_string(),
            user_id: "u1".to_string(),
            days,
            is_public: false,
            transport_modes: modes,
            complete_route: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn aggregator_with(directions: ScriptedDirections) -> (RouteAggregationService, Arc<ScriptedDirections>) {
        let directions = Arc::new(directions);
        (RouteAggregationService::new(directions.clone()), directions)
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(0), "0 m");
        assert_eq!(format_distance(999), "999 m");
        assert_eq!(format_distance(1000), "1.0 km");
        assert_eq!(format_distance(1500), "1.5 km");
        assert_eq!(format_distance(2000), "2.0 km");
        assert_eq!(format_distance(12_345), "12.3 km");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0 min");
        assert_eq!(format_duration(59), "0 min");
        assert_eq!(format_duration(300), "5 min");
        assert_eq!(format_duration(3000), "50 min");
        assert_eq!(format_duration(3600), "1 h 0 min");
        assert_eq!(format_duration(5400), "1 h 30 min");
        assert_eq!(format_duration(7199), "1 h 59 min");
    }

    #[actix_rt::test]
    async fn test_end_to_end_single_day() {
        use TransportMode::{Driving, Walking};

        let directions = ScriptedDirections::default()
            .answer(1.0, 2.0, Walking, Scripted::Route { seconds: 600, meters: 800 })
            .answer(1.0, 2.0, Driving, Scripted::Route { seconds: 300, meters: 1200 })
            .answer(2.0, 3.0, Walking, Scripted::Route { seconds: 900, meters: 1100 })
            .answer(2.0, 3.0, Driving, Scripted::NoRoute);
        let (service, directions) = aggregator_with(directions);

        let mut trip = itinerary(
            vec![day(
                "d1",
                vec![activity("A", 1.0), activity("B", 2.0), activity("C", 3.0)],
            )],
            vec![Walking, Driving],
        );

        let result = service.recompute(&mut trip).await;

        let activities = &trip.days[0].activities;
        let ab = activities[0].route_to_next.as_ref().unwrap();
        assert_eq!(ab.mode, Driving);
        assert_eq!(ab.duration, "5 min");
        assert_eq!(ab.distance, "1.2 km");

        let bc = activities[1].route_to_next.as_ref().unwrap();
        assert_eq!(bc.mode, Walking);
        assert_eq!(bc.duration, "15 min");
        assert_eq!(bc.distance, "1.1 km");

        assert!(activities[2].route_to_next.is_none());

        let day_route = trip.days[0].day_route.as_ref().unwrap();
        assert_eq!(day_route.distance_meters, 2300);
        assert_eq!(day_route.duration_seconds, 1200);
        assert_eq!(day_route.total_distance, "2.3 km");
        assert_eq!(day_route.total_duration, "20 min");
        assert_eq!(day_route.segments.len(), 2);

        let complete = trip.complete_route.as_ref().unwrap();
        assert_eq!(complete.total_distance, "2.3 km");
        assert_eq!(complete.total_duration, "20 min");
        assert_eq!(complete.days.len(), 1);
        assert_eq!(complete.days[0].day_id, "d1");

        assert!(result.unresolved_legs().is_empty());
        assert_eq!(directions.call_count(), 4);
    }

    #[actix_rt::test]
    async fn test_tie_keeps_first_configured_mode() {
        use TransportMode::{Driving, Transit, Walking};

        let directions = ScriptedDirections::default()
            .answer(1.0, 2.0, Transit, Scripted::Route { seconds: 400, meters: 900 })
            .answer(1.0, 2.0, Driving, Scripted::Route { seconds: 400, meters: 1500 })
            .answer(1.0, 2.0, Walking, Scripted::Route { seconds: 400, meters: 700 });
        let (service, _) = aggregator_with(directions);

        let leg = service
            .aggregate_leg(&activity("A", 1.0), &activity("B", 2.0), &[Transit, Driving, Walking])
            .await;
        assert_eq!(leg.route.unwrap().mode, Transit);

        let leg = service
            .aggregate_leg(&activity("A", 1.0), &activity("B", 2.0), &[Walking, Transit, Driving])
            .await;
        assert_eq!(leg.route.unwrap().mode, Walking);
    }

    #[actix_rt::test]
    async fn test_provider_failure_excludes_mode_only() {
        use TransportMode::{Driving, Walking};

        let directions = ScriptedDirections::default()
            .answer(1.0, 2.0, Driving, Scripted::Fail)
            .answer(1.0, 2.0, Walking, Scripted::Route { seconds: 1200, meters: 1000 });
        let (service, _) = aggregator_with(directions);

        let leg = service
            .aggregate_leg(&activity("A", 1.0), &activity("B", 2.0), &[Driving, Walking])
            .await;

        let route = leg.route.unwrap();
        assert_eq!(route.mode, Walking);
        assert_eq!(route.duration_seconds, 1200);
        assert_eq!(leg.failed_attempts.len(), 1);
        assert_eq!(leg.failed_attempts[0].mode, Driving);
    }

    #[actix_rt::test]
    async fn test_unreachable_leg_does_not_abort() {
        use TransportMode::{Driving, Walking};

        // B -> C has nothing scripted: every mode answers "no route".
        let directions = ScriptedDirections::default()
            .answer(1.0, 2.0, Walking, Scripted::Route { seconds: 600, meters: 800 })
            .answer(3.0, 4.0, Driving, Scripted::Fail)
            .answer(3.0, 4.0, Walking, Scripted::Route { seconds: 120, meters: 200 })
            .answer(5.0, 6.0, Driving, Scripted::Route { seconds: 3600, meters: 40_000 });
        let (service, _) = aggregator_with(directions);

        let mut trip = itinerary(
            vec![
                day(
                    "d1",
                    vec![activity("A", 1.0), activity("B", 2.0), activity("C", 3.0), activity("D", 4.0)],
                ),
                day("d2", vec![activity("E", 5.0), activity("F", 6.0)]),
            ],
            vec![Walking, Driving],
        );

        let result = service.recompute(&mut trip).await;

        let first = &trip.days[0];
        assert!(first.activities[0].route_to_next.is_some());
        assert!(first.activities[1].route_to_next.is_none());
        assert!(first.activities[2].route_to_next.is_some());

        let first_route = first.day_route.as_ref().unwrap();
        assert_eq!(first_route.distance_meters, 1000);
        assert_eq!(first_route.duration_seconds, 720);
        assert_eq!(first_route.total_distance, "1.0 km");
        assert_eq!(first_route.total_duration, "12 min");
        assert_eq!(first_route.segments.len(), 2);

        let second_route = trip.days[1].day_route.as_ref().unwrap();
        assert_eq!(second_route.total_duration, "1 h 0 min");

        let complete = trip.complete_route.as_ref().unwrap();
        assert_eq!(complete.distance_meters, 41_000);
        assert_eq!(complete.duration_seconds, 4320);
        assert_eq!(complete.total_distance, "41.0 km");
        assert_eq!(complete.total_duration, "1 h 12 min");

        let unresolved = result.unresolved_legs();
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].day_index, 0);
        assert_eq!(unresolved[0].from_activity, "B");
        assert_eq!(unresolved[0].to_activity, "C");
        assert_eq!(unresolved[0].failed_attempts.len(), 2);
    }

    #[actix_rt::test]
    async fn test_short_days_have_zero_totals() {
        let (service, directions) = aggregator_with(ScriptedDirections::default());

        let mut trip = itinerary(
            vec![day("empty", vec![]), day("single", vec![activity("A", 1.0)])],
            vec![TransportMode::Walking],
        );
        service.recompute(&mut trip).await;

        for day in &trip.days {
            let route = day.day_route.as_ref().unwrap();
            assert_eq!(route.distance_meters, 0);
            assert_eq!(route.duration_seconds, 0);
            assert_eq!(route.total_distance, "0 m");
            assert_eq!(route.total_duration, "0 min");
            assert!(route.segments.is_empty());
        }
        assert!(trip.days[1].activities[0].route_to_next.is_none());
        assert_eq!(trip.complete_route.as_ref().unwrap().days.len(), 2);
        assert_eq!(directions.call_count(), 0);
    }

    #[actix_rt::test]
    async fn test_empty_mode_set_leaves_every_leg_unresolved() {
        let (service, directions) = aggregator_with(ScriptedDirections::default());

        let result = service
            .aggregate_trip(&[day("d1", vec![activity("A", 1.0), activity("B", 2.0)])], &[])
            .await;

        assert_eq!(result.distance_meters, 0);
        assert_eq!(result.unresolved_legs().len(), 1);
        assert!(result.unresolved_legs()[0].failed_attempts.is_empty());
        assert_eq!(directions.call_count(), 0);
    }

    #[actix_rt::test]
    async fn test_repeated_modes_queried_once() {
        use TransportMode::Walking;

        let directions = ScriptedDirections::default()
            .answer(1.0, 2.0, Walking, Scripted::Route { seconds: 60, meters: 80 });
        let (service, directions) = aggregator_with(directions);

        service
            .aggregate_leg(&activity("A", 1.0), &activity("B", 2.0), &[Walking, Walking])
            .await;
        assert_eq!(directions.call_count(), 1);
    }

    #[actix_rt::test]
    async fn test_recompute_replaces_stale_routes() {
        use TransportMode::Walking;

        let (service, _) = aggregator_with(ScriptedDirections::default());

        let stale = RouteLeg {
            distance: "9.9 km".to_string(),
            duration: "2 h 0 min".to_string(),
            mode: Walking,
            distance_meters: 9900,
            duration_seconds: 7200,
            full_route: json!({}),
        };
        let mut first = activity("A", 1.0);
        first.route_to_next = Some(stale.clone());
        let mut last = activity("B", 2.0);
        last.route_to_next = Some(stale);

        let mut trip = itinerary(vec![day("d1", vec![first, last])], vec![Walking]);
        service.recompute(&mut trip).await;

        assert!(trip.days[0].activities[0].route_to_next.is_none());
        assert!(trip.days[0].activities[1].route_to_next.is_none());
        assert_eq!(trip.complete_route.unwrap().distance_meters, 0);
    }

    #[actix_rt::test]
    async fn test_full_route_payload_kept() {
        use TransportMode::Driving;

        let directions = ScriptedDirections::default()
            .answer(1.0, 2.0, Driving, Scripted::Route { seconds: 300, meters: 1200 });
        let (service, _) = aggregator_with(directions);

        let leg = service
            .aggregate_leg(&activity("A", 1.0), &activity("B", 2.0), &[Driving])
            .await;
        assert_eq!(
            leg.route.unwrap().full_route,
            json!({ "mode": "driving", "seconds": 300 })
        );
    }
}
