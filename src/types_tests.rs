//! Tests for core types

#[cfg(test)]
mod tests {
    use super::super::error::PredictError;
    use super::super::types::*;
    use chrono::NaiveDate;
    use std::cmp::Ordering;

    fn prediction(league: &str, home: &str, away: &str) -> Prediction {
        Prediction {
            home_team: home.to_string(),
            away_team: away.to_string(),
            league: league.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            p_home: 0.45,
            p_draw: 0.27,
            p_away: 0.28,
            p_btts_yes: 0.5,
            p_over_1_5: 0.7,
            p_over_2_5: 0.45,
            p_over_3_5: 0.24,
            avg_goals_home_last3: GoalRate::new(1.7).unwrap(),
            avg_goals_away_last3: GoalRate::new(1.3).unwrap(),
            top_scores: vec![ScoreLine {
                score: "1-1".to_string(),
                p: 0.12,
            }],
        }
    }

    #[test]
    fn test_goal_rate_validation() {
        assert_eq!(GoalRate::new(0.0).unwrap(), GoalRate::ZERO);
        assert_eq!(GoalRate::new(2.5).unwrap().value(), 2.5);
        assert!(matches!(
            GoalRate::new(-0.1),
            Err(PredictError::InvalidRate(_))
        ));
        assert!(GoalRate::new(f64::NAN).is_err());
        assert!(GoalRate::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_goal_rate_serde() {
        let rate: GoalRate = serde_json::from_str("1.7").unwrap();
        assert_eq!(rate.value(), 1.7);
        assert_eq!(serde_json::to_string(&rate).unwrap(), "1.7");
        assert!(serde_json::from_str::<GoalRate>("-1.0").is_err());
    }

    #[test]
    fn test_goal_rate_display() {
        assert_eq!(GoalRate::new(1.0).unwrap().to_string(), "1.0");
        assert_eq!(GoalRate::new(2.33).unwrap().to_string(), "2.3");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-03-01").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
        assert_eq!(
            parse_date(" 2025-12-31 ").unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        );
        for bad in ["", "01-03-2025", "2025-02-30", "tomorrow"] {
            assert!(matches!(parse_date(bad), Err(PredictError::InvalidDate(_))), "{bad}");
        }
    }

    #[test]
    fn test_display_order() {
        let a = prediction("La Liga", "Sevilla", "Valencia");
        let b = prediction("Premier League", "Arsenal", "Chelsea");
        let c = prediction("Premier League", "Arsenal", "Everton");
        let d = prediction("Premier League", "Brentford", "Arsenal");

        assert_eq!(a.display_order(&b), Ordering::Less);
        assert_eq!(b.display_order(&c), Ordering::Less);
        assert_eq!(c.display_order(&d), Ordering::Less);
        assert_eq!(d.display_order(&d.clone()), Ordering::Equal);

        let mut day = vec![d.clone(), c.clone(), a.clone(), b.clone()];
        day.sort_by(|x, y| x.display_order(y));
        assert_eq!(day, vec![a, b, c, d]);
    }

    #[test]
    fn test_probabilities_include_top_scores() {
        let p = prediction("Ligue 1", "PSG", "Monaco");
        let all: Vec<f64> = p.probabilities().collect();
        assert_eq!(all.len(), 8);
        assert_eq!(all[7], 0.12);
    }

    #[test]
    fn test_prediction_json_is_flat() {
        let json = serde_json::to_value(prediction("Eredivisie", "Ajax", "PSV")).unwrap();
        for key in [
            "home_team",
            "away_team",
            "league",
            "date",
            "p_home",
            "p_draw",
            "p_away",
            "p_btts_yes",
            "p_over_1_5",
            "p_over_2_5",
            "p_over_3_5",
            "avg_goals_home_last3",
            "avg_goals_away_last3",
            "top_scores",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["avg_goals_away_last3"], 1.3);

        let back: Prediction = serde_json::from_value(json).unwrap();
        assert_eq!(back.home_team, "Ajax");
    }

    #[test]
    fn test_prediction_with_negative_rate_rejected() {
        let mut json = serde_json::to_value(prediction("Eredivisie", "Ajax", "PSV")).unwrap();
        json["avg_goals_home_last3"] = serde_json::json!(-2.0);
        assert!(serde_json::from_value::<Prediction>(json).is_err());
    }
}
