//! Shared projection math for the market models.
//!
//! Every market starts from the same tempo and efficiency expectations and
//! the same four-factors matchup read. Each model layers its own venue,
//! calibration and scaling on top of these.

use crate::config::{LeagueAverages, MatchupWeights, ModelConfig};
use crate::ratings::TeamRatings;
use crate::types::BetType;

/// Expected tempo, efficiencies and base scores for one matchup.
#[derive(Clone, Copy, Debug)]
pub struct BaseProjection {
    /// Possessions both teams combined push the game to, relative to the
    /// league baseline.
    pub expected_tempo: f64,
    pub home_efficiency: f64,
    pub away_efficiency: f64,
    pub home_base: f64,
    pub away_base: f64,
}

impl BaseProjection {
    pub fn project(home: &TeamRatings, away: &TeamRatings, league: &LeagueAverages) -> Self {
        let expected_tempo = home.tempo + away.tempo - league.tempo;
        let home_efficiency = home.adj_o + away.adj_d - league.efficiency;
        let away_efficiency = away.adj_o + home.adj_d - league.efficiency;
        Self {
            expected_tempo,
            home_efficiency,
            away_efficiency,
            home_base: home_efficiency * expected_tempo / 100.0,
            away_base: away_efficiency * expected_tempo / 100.0,
        }
    }

    /// Home margin before venue, matchup and situation.
    pub fn raw_margin(&self) -> f64 {
        self.home_base - self.away_base
    }

    pub fn base_total(&self) -> f64 {
        self.home_base + self.away_base
    }
}

/// Four-factors matchup adjustment in points, positive favoring home.
///
/// Each side's rebounding edge combines its own offensive glass work with
/// the second chances the opponent concedes. Turnover and free-throw edges
/// compare the rates each offense is expected to post against the other's
/// defense.
pub fn matchup_adjustment(
    home: &TeamRatings,
    away: &TeamRatings,
    league: &LeagueAverages,
    weights: &MatchupWeights,
) -> f64 {
    let home_orb_adv = (home.orb - league.orb_pct) + ((100.0 - away.drb) - league.orb_pct);
    let away_orb_adv = (away.orb - league.orb_pct) + ((100.0 - home.drb) - league.orb_pct);
    let net_rebound_edge = home_orb_adv - away_orb_adv;

    let expected_home_tor = league.tor_pct + (home.tor - league.tor_pct) + (away.tord - league.tor_pct);
    let expected_away_tor = league.tor_pct + (away.tor - league.tor_pct) + (home.tord - league.tor_pct);
    // Positive when home gives the ball away less often.
    let net_turnover_edge = expected_away_tor - expected_home_tor;

    let expected_home_ftr = league.ftr + (home.ftr - league.ftr) + (away.ftrd - league.ftr);
    let expected_away_ftr = league.ftr + (away.ftr - league.ftr) + (home.ftrd - league.ftr);
    let net_ft_edge = expected_home_ftr - expected_away_ftr;

    net_rebound_edge * weights.rebounding
        + net_turnover_edge * weights.turnovers
        + net_ft_edge * weights.free_throws
}

/// Confidence in a prediction from rating quality, edge size and style fit.
///
/// Ranks proxy both rating reliability and games played, so they are
/// counted twice at different weights. The edge is measured in units of the
/// market's backtest standard error.
pub fn statistical_confidence(
    home: &TeamRatings,
    away: &TeamRatings,
    market: BetType,
    predicted_edge: f64,
    config: &ModelConfig,
) -> f64 {
    let mut confidence = 0.50;

    let avg_rank = f64::from(home.rank + away.rank) / 2.0;
    if avg_rank < 25.0 {
        confidence += 0.15;
    } else if avg_rank < 50.0 {
        confidence += 0.10;
    } else if avg_rank < 100.0 {
        confidence += 0.05;
    } else if avg_rank > 250.0 {
        confidence -= 0.05;
    }

    if avg_rank < 50.0 {
        confidence += 0.08;
    } else if avg_rank < 100.0 {
        confidence += 0.05;
    } else if avg_rank > 250.0 {
        confidence -= 0.03;
    }

    let edge_z = predicted_edge.abs() / config.std_error_for(market);
    if edge_z > 2.0 {
        confidence += 0.10;
    } else if edge_z > 1.5 {
        confidence += 0.05;
    } else if edge_z < 0.5 {
        confidence -= 0.05;
    }

    let quality_diff = (home.barthag - away.barthag).abs();
    if quality_diff < 0.1 {
        confidence += 0.04;
    } else if quality_diff > 0.3 {
        confidence -= 0.02;
    }

    let tempo_diff = (home.tempo - away.tempo).abs();
    let three_pt_diff = (home.three_pt_rate - away.three_pt_rate).abs();
    let style_consistency = 1.0 - ((tempo_diff / 20.0 + three_pt_diff / 20.0) / 2.0).min(1.0);
    confidence += (style_consistency - 0.5) * 0.04;

    confidence.clamp(0.30, 0.95)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::testutil::league_average_row;

    #[test]
    fn league_average_matchup_projects_to_baseline() {
        let home = TeamRatings::from_row(league_average_row("Home")).unwrap();
        let away = TeamRatings::from_row(league_average_row("Away")).unwrap();
        let league = LeagueAverages::default();
        let projection = BaseProjection::project(&home, &away, &league);
        assert!((projection.expected_tempo - 67.6).abs() < 1e-9);
        assert!((projection.home_base - 105.5 * 67.6 / 100.0).abs() < 1e-9);
        assert!(projection.raw_margin().abs() < 1e-9);
        assert!(matchup_adjustment(&home, &away, &league, &MatchupWeights::default()).abs() < 1e-9);
    }

    #[test]
    fn rebounding_edge_favors_the_glass() {
        let mut row = league_average_row("Home");
        row.orb = Some(34.0);
        let home = TeamRatings::from_row(row).unwrap();
        let away = TeamRatings::from_row(league_average_row("Away")).unwrap();
        let adj = matchup_adjustment(
            &home,
            &away,
            &LeagueAverages::default(),
            &MatchupWeights::default(),
        );
        // Six extra ORB points at 0.15 per point.
        assert!((adj - 0.9).abs() < 1e-9);
    }

    #[test]
    fn confidence_stays_in_band() {
        let mut row = league_average_row("Home");
        row.rank = Some(1);
        row.barthag = Some(0.99);
        let elite = TeamRatings::from_row(row).unwrap();
        let mut row = league_average_row("Away");
        row.rank = Some(2);
        row.barthag = Some(0.98);
        let rival = TeamRatings::from_row(row).unwrap();
        let config = ModelConfig::default();
        let high = statistical_confidence(&elite, &rival, BetType::Spread, 30.0, &config);
        assert!(high <= 0.95);

        let mut row = league_average_row("Home");
        row.rank = Some(350);
        let low_home = TeamRatings::from_row(row).unwrap();
        let mut row = league_average_row("Away");
        row.rank = Some(360);
        row.tempo = Some(80.0);
        row.three_pt_rate = Some(55.0);
        let low_away = TeamRatings::from_row(row).unwrap();
        let low = statistical_confidence(&low_home, &low_away, BetType::Spread, 0.1, &config);
        assert!(low >= 0.30);
        assert!(low < high);
    }

    #[test]
    fn bigger_edges_earn_more_confidence() {
        let home = TeamRatings::from_row(league_average_row("Home")).unwrap();
        let away = TeamRatings::from_row(league_average_row("Away")).unwrap();
        let config = ModelConfig::default();
        // std_error 10.57: 25 points is past 2 sigma, 1 point is under half.
        let big = statistical_confidence(&home, &away, BetType::Spread, 25.0, &config);
        let small = statistical_confidence(&home, &away, BetType::Spread, 1.0, &config);
        assert!((big - small - 0.15).abs() < 1e-9);
    }
}
