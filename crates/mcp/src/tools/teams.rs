// Static table of the 30 major league clubs

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum League {
    #[serde(rename = "AL")]
    American,
    #[serde(rename = "NL")]
    National,
}

impl League {
    /// League id used by the stats API
    pub fn id(self) -> u32 {
        match self {
            League::American => 103,
            League::National => 104,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Team {
    pub team_id: u32,
    pub team_name: &'static str,
    pub abbreviation: &'static str,
    pub league: League,
}

const fn team(team_id: u32, team_name: &'static str, abbreviation: &'static str, league: League) -> Team {
    Team {
        team_id,
        team_name,
        abbreviation,
        league,
    }
}

use League::{American as AL, National as NL};

pub static TEAMS: [Team; 30] = [
    team(108, "Los Angeles Angels", "LAA", AL),
    team(109, "Arizona Diamondbacks", "AZ", NL),
    team(110, "Baltimore Orioles", "BAL", AL),
    team(111, "Boston Red Sox", "BOS", AL),
    team(112, "Chicago Cubs", "CHC", NL),
    team(113, "Cincinnati Reds", "CIN", NL),
    team(114, "Cleveland Guardians", "CLE", AL),
    team(115, "Colorado Rockies", "COL", NL),
    team(116, "Detroit Tigers", "DET", AL),
    team(117, "Houston Astros", "HOU", AL),
    team(118, "Kansas City Royals", "KC", AL),
    team(119, "Los Angeles Dodgers", "LAD", NL),
    team(120, "Washington Nationals", "WSH", NL),
    team(121, "New York Mets", "NYM", NL),
    team(133, "Athletics", "ATH", AL),
    team(134, "Pittsburgh Pirates", "PIT", NL),
    team(135, "San Diego Padres", "SD", NL),
    team(136, "Seattle Mariners", "SEA", AL),
    team(137, "San Francisco Giants", "SF", NL),
    team(138, "St. Louis Cardinals", "STL", NL),
    team(139, "Tampa Bay Rays", "TB", AL),
    team(140, "Texas Rangers", "TEX", AL),
    team(141, "Toronto Blue Jays", "TOR", AL),
    team(142, "Minnesota Twins", "MIN", AL),
    team(143, "Philadelphia Phillies", "PHI", NL),
    team(144, "Atlanta Braves", "ATL", NL),
    team(145, "Chicago White Sox", "CWS", AL),
    team(146, "Miami Marlins", "MIA", NL),
    team(147, "New York Yankees", "NYY", AL),
    team(158, "Milwaukee Brewers", "MIL", NL),
];

/// Resolve a team id from a numeric string, full name, abbreviation or
/// part of a name. Numeric strings are taken as ids without checking the table.
pub fn resolve_team_id(query: &str) -> Option<u32> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    if let Ok(id) = query.parse::<u32>() {
        return Some(id);
    }

    let lower = query.to_lowercase();

    TEAMS
        .iter()
        .find(|t| t.team_name.to_lowercase() == lower)
        .or_else(|| TEAMS.iter().find(|t| t.abbreviation.eq_ignore_ascii_case(query)))
        .or_else(|| TEAMS.iter().find(|t| t.team_name.to_lowercase().contains(&lower)))
        .map(|t| t.team_id)
}

/// How `search_teams` compares the query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKey {
    Name,
    Id,
    All,
}

impl SearchKey {
    pub fn parse(key: &str) -> Self {
        match key {
            "id" => SearchKey::Id,
            "name" => SearchKey::Name,
            _ => SearchKey::All,
        }
    }
}

pub fn search_teams(query: &str, key: SearchKey) -> Vec<Team> {
    let lower = query.trim().to_lowercase();
    let id_match = |t: &Team| t.team_id.to_string() == query.trim();
    let name_match = |t: &Team| t.team_name.to_lowercase().contains(&lower);

    TEAMS
        .iter()
        .filter(|t| match key {
            SearchKey::Id => id_match(t),
            SearchKey::Name => name_match(t),
            SearchKey::All => id_match(t) || name_match(t),
        })
        .copied()
        .collect()
}
