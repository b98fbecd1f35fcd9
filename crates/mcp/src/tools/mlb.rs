// MLB statistics tools backed by the public stats API

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::stats_api::StatsApi;
use crate::tools::teams::{resolve_team_id, search_teams, League, SearchKey};
use crate::tools::{
    json_schema_integer, json_schema_object, json_schema_string, Tool,
};
use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};

/// Results above this many words are refused
pub const MAX_RESULT_WORDS: usize = 100_000;

/// The stats API endpoints exposed as tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MlbEndpoint {
    Standings,
    Schedule,
    TeamInfo,
    PlayerInfo,
    Roster,
    SearchPlayers,
    Teams,
    SearchTeams,
    Boxscore,
    Linescore,
    MultiplePlayerStats,
    Sabermetrics,
    Draft,
    Awards,
    GameHighlights,
    GamePace,
    GameScoringPlays,
    Players,
    GameLineup,
}

impl MlbEndpoint {
    pub const ALL: [MlbEndpoint; 19] = [
        MlbEndpoint::Standings,
        MlbEndpoint::Schedule,
        MlbEndpoint::TeamInfo,
        MlbEndpoint::PlayerInfo,
        MlbEndpoint::Roster,
        MlbEndpoint::SearchPlayers,
        MlbEndpoint::Teams,
        MlbEndpoint::SearchTeams,
        MlbEndpoint::Boxscore,
        MlbEndpoint::Linescore,
        MlbEndpoint::MultiplePlayerStats,
        MlbEndpoint::Sabermetrics,
        MlbEndpoint::Draft,
        MlbEndpoint::Awards,
        MlbEndpoint::GameHighlights,
        MlbEndpoint::GamePace,
        MlbEndpoint::GameScoringPlays,
        MlbEndpoint::Players,
        MlbEndpoint::GameLineup,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MlbEndpoint::Standings => "get_mlb_standings",
            MlbEndpoint::Schedule => "get_mlb_schedule",
            MlbEndpoint::TeamInfo => "get_mlb_team_info",
            MlbEndpoint::PlayerInfo => "get_mlb_player_info",
            MlbEndpoint::Roster => "get_mlb_roster",
            MlbEndpoint::SearchPlayers => "get_mlb_search_players",
            MlbEndpoint::Teams => "get_mlb_teams",
            MlbEndpoint::SearchTeams => "get_mlb_search_teams",
            MlbEndpoint::Boxscore => "get_mlb_boxscore",
            MlbEndpoint::Linescore => "get_mlb_linescore",
            MlbEndpoint::MultiplePlayerStats => "get_multiple_mlb_player_stats",
            MlbEndpoint::Sabermetrics => "get_mlb_sabermetrics",
            MlbEndpoint::Draft => "get_mlb_draft",
            MlbEndpoint::Awards => "get_mlb_awards",
            MlbEndpoint::GameHighlights => "get_mlb_game_highlights",
            MlbEndpoint::GamePace => "get_mlb_game_pace",
            MlbEndpoint::GameScoringPlays => "get_mlb_game_scoring_plays",
            MlbEndpoint::Players => "get_mlb_players",
            MlbEndpoint::GameLineup => "get_mlb_game_lineup",
        }
    }

    fn description(self) -> &'static str {
        match self {
            MlbEndpoint::Standings => {
                "Get MLB standings for a season. league accepts 'AL', 'NL' or 'both' (default)."
            }
            MlbEndpoint::Schedule => {
                "Get the MLB schedule for a date range (YYYY-MM-DD), optionally for one team (id, name or abbreviation)."
            }
            MlbEndpoint::TeamInfo => "Get information about a team by id, name or abbreviation.",
            MlbEndpoint::PlayerInfo => "Get biographical information for a player by id.",
            MlbEndpoint::Roster => {
                "Get a team roster by id, name or abbreviation. date defaults to today."
            }
            MlbEndpoint::SearchPlayers => "Search player ids by full name.",
            MlbEndpoint::Teams => "Get all teams for a sport, optionally for one season.",
            MlbEndpoint::SearchTeams => {
                "Search the 30 MLB clubs by name or id. search_key is 'name' (default), 'id' or 'all'."
            }
            MlbEndpoint::Boxscore => "Get the boxscore for a game by game id.",
            MlbEndpoint::Linescore => "Get the linescore for a game by game id.",
            MlbEndpoint::MultiplePlayerStats => {
                "Get stats for comma separated player ids. group is hitting (default) or pitching; type 'season' gives season and advanced stats, anything else career stats."
            }
            MlbEndpoint::Sabermetrics => {
                "Get sabermetric stats (WAR, wOBA, wRC+ and more) for comma separated player ids in one season."
            }
            MlbEndpoint::Draft => "Get draft picks for a year.",
            MlbEndpoint::Awards => "Get recipients of an award by award id, e.g. 'ALMVP' or 'NLCY'.",
            MlbEndpoint::GameHighlights => "Get video highlights for a game by game id.",
            MlbEndpoint::GamePace => "Get game pace statistics (game length, pitches per game) for a season.",
            MlbEndpoint::GameScoringPlays => {
                "Get the plays of a game by game id, optionally only those of one eventType (e.g. 'home_run', 'strikeout')."
            }
            MlbEndpoint::Players => "Get all players for a sport, optionally for one season.",
            MlbEndpoint::GameLineup => {
                "Get both lineups of a game by game id: players, positions, batting order and substitutions."
            }
        }
    }

    fn input_schema(self) -> Value {
        let team = json_schema_string("Team id, full name, abbreviation or part of a name");
        let season = json_schema_integer("Season year");
        let game_id = json_schema_integer("Game id (gamePk)");
        let fields = json_schema_string("Comma separated list of fields to include");
        let hydrate = json_schema_string("Additional data to hydrate");

        match self {
            MlbEndpoint::Standings => json_schema_object(
                json!({
                    "season": json_schema_integer("Season year, defaults to the current year"),
                    "standingsTypes": json_schema_string("Standings type, e.g. regularSeason or wildCard"),
                    "date": json_schema_string("Date in YYYY-MM-DD format"),
                    "hydrate": hydrate,
                    "fields": fields,
                    "league": json_schema_string("'AL', 'NL' or 'both'"),
                }),
                vec![],
            ),
            MlbEndpoint::Schedule => json_schema_object(
                json!({
                    "start_date": json_schema_string("Start date in YYYY-MM-DD format"),
                    "end_date": json_schema_string("End date in YYYY-MM-DD format"),
                    "sport_id": json_schema_integer("Sport id, 1 for MLB"),
                    "team": team,
                }),
                vec!["start_date", "end_date"],
            ),
            MlbEndpoint::TeamInfo => json_schema_object(
                json!({
                    "team": team,
                    "season": season,
                    "sport_id": json_schema_integer("Sport id"),
                    "hydrate": hydrate,
                    "fields": fields,
                }),
                vec!["team"],
            ),
            MlbEndpoint::PlayerInfo => json_schema_object(
                json!({ "player_id": json_schema_integer("Player id") }),
                vec!["player_id"],
            ),
            MlbEndpoint::Roster => json_schema_object(
                json!({
                    "team": team,
                    "date": json_schema_string("Date in YYYY-MM-DD format, defaults to today"),
                    "rosterType": json_schema_string("Roster type, e.g. 40Man or fullSeason"),
                    "season": json_schema_string("Season year"),
                    "hydrate": hydrate,
                    "fields": fields,
                }),
                vec!["team"],
            ),
            MlbEndpoint::SearchPlayers => json_schema_object(
                json!({
                    "fullname": json_schema_string("Player name to search for"),
                    "sport_id": json_schema_integer("Sport id, 1 for MLB"),
                    "search_key": json_schema_string("Player field to compare, default fullName"),
                }),
                vec!["fullname"],
            ),
            MlbEndpoint::Teams => json_schema_object(
                json!({
                    "sport_id": json_schema_integer("Sport id, 1 for MLB"),
                    "season": season,
                }),
                vec![],
            ),
            MlbEndpoint::SearchTeams => json_schema_object(
                json!({
                    "team_name": json_schema_string("Team name or id"),
                    "search_key": json_schema_string("'name', 'id' or 'all'"),
                }),
                vec!["team_name"],
            ),
            MlbEndpoint::Boxscore => json_schema_object(
                json!({
                    "game_id": game_id,
                    "timecode": json_schema_string("Timecode of the snapshot"),
                    "fields": fields,
                }),
                vec!["game_id"],
            ),
            MlbEndpoint::Linescore => {
                json_schema_object(json!({ "game_id": game_id }), vec!["game_id"])
            }
            MlbEndpoint::MultiplePlayerStats => json_schema_object(
                json!({
                    "player_ids": json_schema_string("Comma separated player ids"),
                    "group": json_schema_string("Stat group, e.g. hitting or pitching"),
                    "type": json_schema_string("Stat type, e.g. season or career"),
                    "season": season,
                }),
                vec!["player_ids"],
            ),
            MlbEndpoint::Sabermetrics => json_schema_object(
                json!({
                    "player_ids": json_schema_string("Comma separated player ids"),
                    "season": season,
                    "stat_name": json_schema_string("Single stat to extract, e.g. war or woba"),
                    "group": json_schema_string("'hitting' (default) or 'pitching'"),
                }),
                vec!["player_ids", "season"],
            ),
            MlbEndpoint::Draft => json_schema_object(
                json!({ "year_id": json_schema_integer("Draft year") }),
                vec!["year_id"],
            ),
            MlbEndpoint::Awards => json_schema_object(
                json!({ "award_id": json_schema_string("Award id, e.g. ALMVP") }),
                vec!["award_id"],
            ),
            MlbEndpoint::GameHighlights | MlbEndpoint::GameLineup => {
                json_schema_object(json!({ "game_id": game_id }), vec!["game_id"])
            }
            MlbEndpoint::GamePace => json_schema_object(
                json!({
                    "season": season,
                    "sport_id": json_schema_integer("Sport id, 1 for MLB"),
                }),
                vec!["season"],
            ),
            MlbEndpoint::GameScoringPlays => json_schema_object(
                json!({
                    "game_id": game_id,
                    "eventType": json_schema_string("Only plays of this event type, e.g. home_run"),
                    "timecode": json_schema_string("Timecode of the snapshot"),
                    "fields": fields,
                }),
                vec!["game_id"],
            ),
            MlbEndpoint::Players => json_schema_object(
                json!({
                    "sport_id": json_schema_integer("Sport id, 1 for MLB"),
                    "season": season,
                }),
                vec![],
            ),
        }
    }

    /// What to tell the caller to narrow when a result is too large
    fn narrowing_hint(self) -> &'static str {
        match self {
            MlbEndpoint::Schedule => "team",
            MlbEndpoint::Roster => "roster type",
            MlbEndpoint::Boxscore | MlbEndpoint::Linescore => "fields",
            MlbEndpoint::GameScoringPlays => "eventType",
            MlbEndpoint::Players => "season",
            _ => "filters",
        }
    }
}

fn sport_one() -> u32 {
    1
}

fn both() -> String {
    "both".to_string()
}

fn hitting() -> String {
    "hitting".to_string()
}

fn name_key() -> String {
    "name".to_string()
}

fn fullname_key() -> String {
    "fullname".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StandingsArgs {
    season: Option<i32>,
    standings_types: Option<String>,
    date: Option<String>,
    hydrate: Option<String>,
    fields: Option<String>,
    #[serde(default = "both")]
    league: String,
}

#[derive(Debug, Deserialize)]
struct ScheduleArgs {
    start_date: String,
    end_date: String,
    #[serde(default = "sport_one")]
    sport_id: u32,
    team: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TeamInfoArgs {
    team: String,
    season: Option<i32>,
    sport_id: Option<u32>,
    hydrate: Option<String>,
    fields: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlayerArgs {
    player_id: u64,
}

#[derive(Debug, Deserialize)]
struct RosterArgs {
    team: String,
    date: Option<String>,
    #[serde(rename = "rosterType")]
    roster_type: Option<String>,
    season: Option<String>,
    hydrate: Option<String>,
    fields: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchPlayersArgs {
    fullname: String,
    #[serde(default = "sport_one")]
    sport_id: u32,
    #[serde(default = "fullname_key")]
    search_key: String,
}

#[derive(Debug, Deserialize)]
struct TeamsArgs {
    #[serde(default = "sport_one")]
    sport_id: u32,
    season: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct SearchTeamsArgs {
    team_name: String,
    #[serde(default = "name_key")]
    search_key: String,
}

#[derive(Debug, Deserialize)]
struct GameArgs {
    game_id: u64,
    timecode: Option<String>,
    fields: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlayerStatsArgs {
    player_ids: String,
    group: Option<String>,
    #[serde(rename = "type")]
    stat_type: Option<String>,
    season: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct SabermetricsArgs {
    player_ids: String,
    season: i32,
    stat_name: Option<String>,
    #[serde(default = "hitting")]
    group: String,
}

#[derive(Debug, Deserialize)]
struct DraftArgs {
    year_id: i32,
}

#[derive(Debug, Deserialize)]
struct AwardsArgs {
    award_id: String,
}

#[derive(Debug, Deserialize)]
struct GamePaceArgs {
    season: i32,
    #[serde(default = "sport_one")]
    sport_id: u32,
}

#[derive(Debug, Deserialize)]
struct PlaysArgs {
    game_id: u64,
    #[serde(rename = "eventType")]
    event_type: Option<String>,
    timecode: Option<String>,
    fields: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlayersArgs {
    #[serde(default = "sport_one")]
    sport_id: u32,
    season: Option<i32>,
}

/// One stats API endpoint exposed as an MCP tool
pub struct MlbTool {
    endpoint: MlbEndpoint,
    api: StatsApi,
}

impl MlbTool {
    pub fn new(endpoint: MlbEndpoint, api: StatsApi) -> Self {
        Self { endpoint, api }
    }

    /// One tool per endpoint, sharing the same API client
    pub fn all(api: &StatsApi) -> Vec<MlbTool> {
        MlbEndpoint::ALL
            .iter()
            .map(|e| MlbTool::new(*e, api.clone()))
            .collect()
    }

    async fn run(&self, arguments: Value) -> Result<Value> {
        let arguments = if arguments.is_null() { json!({}) } else { arguments };
        let name = self.endpoint.name();
        let invalid = || format!("Invalid arguments for {}", name);

        match self.endpoint {
            MlbEndpoint::Standings => {
                let args: StandingsArgs = serde_json::from_value(arguments).with_context(invalid)?;
                self.standings(args).await
            }
            MlbEndpoint::Schedule => {
                let args: ScheduleArgs = serde_json::from_value(arguments).with_context(invalid)?;
                self.schedule(args).await
            }
            MlbEndpoint::TeamInfo => {
                let args: TeamInfoArgs = serde_json::from_value(arguments).with_context(invalid)?;
                let team_id = team_id(&args.team)?;
                let data = self
                    .api
                    .get(
                        &format!("teams/{}", team_id),
                        &[
                            ("season", args.season.map(|s| s.to_string())),
                            ("sportId", args.sport_id.map(|s| s.to_string())),
                            ("hydrate", args.hydrate),
                            ("fields", args.fields),
                        ],
                    )
                    .await?;
                Ok(json!({ "team_info": data }))
            }
            MlbEndpoint::PlayerInfo => {
                let args: PlayerArgs = serde_json::from_value(arguments).with_context(invalid)?;
                let data = self
                    .api
                    .get(&format!("people/{}", args.player_id), &[])
                    .await?;
                Ok(json!({ "player_info": data }))
            }
            MlbEndpoint::Roster => {
                let args: RosterArgs = serde_json::from_value(arguments).with_context(invalid)?;
                let team_id = team_id(&args.team)?;
                let date = args
                    .date
                    .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
                self.api
                    .get(
                        &format!("teams/{}/roster", team_id),
                        &[
                            ("rosterType", args.roster_type),
                            ("season", args.season),
                            ("date", Some(date)),
                            ("hydrate", args.hydrate),
                            ("fields", args.fields),
                        ],
                    )
                    .await
            }
            MlbEndpoint::SearchPlayers => {
                let args: SearchPlayersArgs =
                    serde_json::from_value(arguments).with_context(invalid)?;
                self.search_players(args).await
            }
            MlbEndpoint::Teams => {
                let args: TeamsArgs = serde_json::from_value(arguments).with_context(invalid)?;
                let data = self
                    .api
                    .get(
                        "teams",
                        &[
                            ("sportId", Some(args.sport_id.to_string())),
                            ("season", args.season.map(|s| s.to_string())),
                        ],
                    )
                    .await?;
                Ok(json!({ "teams": data.get("teams").cloned().unwrap_or(data) }))
            }
            MlbEndpoint::SearchTeams => {
                let args: SearchTeamsArgs =
                    serde_json::from_value(arguments).with_context(invalid)?;
                let teams = search_teams(&args.team_name, SearchKey::parse(&args.search_key));
                Ok(json!({ "teams": teams }))
            }
            MlbEndpoint::Boxscore => {
                let args: GameArgs = serde_json::from_value(arguments).with_context(invalid)?;
                self.api
                    .get(
                        &format!("game/{}/boxscore", args.game_id),
                        &[("timecode", args.timecode), ("fields", args.fields)],
                    )
                    .await
            }
            MlbEndpoint::Linescore => {
                let args: GameArgs = serde_json::from_value(arguments).with_context(invalid)?;
                self.api
                    .get(&format!("game/{}/linescore", args.game_id), &[])
                    .await
            }
            MlbEndpoint::MultiplePlayerStats => {
                let args: PlayerStatsArgs =
                    serde_json::from_value(arguments).with_context(invalid)?;
                self.player_stats(args).await
            }
            MlbEndpoint::Sabermetrics => {
                let args: SabermetricsArgs =
                    serde_json::from_value(arguments).with_context(invalid)?;
                self.sabermetrics(args).await
            }
            MlbEndpoint::Draft => {
                let args: DraftArgs = serde_json::from_value(arguments).with_context(invalid)?;
                let data = self.api.get(&format!("draft/{}", args.year_id), &[]).await?;
                Ok(json!({ "draft": data.get("drafts").cloned().unwrap_or(data) }))
            }
            MlbEndpoint::Awards => {
                let args: AwardsArgs = serde_json::from_value(arguments).with_context(invalid)?;
                let data = self
                    .api
                    .get(&format!("awards/{}/recipients", args.award_id.trim()), &[])
                    .await?;
                Ok(json!({ "awards": data.get("awards").cloned().unwrap_or(data) }))
            }
            MlbEndpoint::GameHighlights => {
                let args: GameArgs = serde_json::from_value(arguments).with_context(invalid)?;
                let data = self
                    .api
                    .get(&format!("game/{}/content", args.game_id), &[])
                    .await?;
                Ok(json!({ "highlights": data.get("highlights").cloned().unwrap_or(Value::Null) }))
            }
            MlbEndpoint::GamePace => {
                let args: GamePaceArgs = serde_json::from_value(arguments).with_context(invalid)?;
                let data = self
                    .api
                    .get(
                        "gamePace",
                        &[
                            ("season", Some(args.season.to_string())),
                            ("sportId", Some(args.sport_id.to_string())),
                        ],
                    )
                    .await?;
                Ok(json!({ "game_pace": data }))
            }
            MlbEndpoint::GameScoringPlays => {
                let args: PlaysArgs = serde_json::from_value(arguments).with_context(invalid)?;
                self.plays(args).await
            }
            MlbEndpoint::Players => {
                let args: PlayersArgs = serde_json::from_value(arguments).with_context(invalid)?;
                let data = self
                    .api
                    .get(
                        &format!("sports/{}/players", args.sport_id),
                        &[("season", args.season.map(|s| s.to_string()))],
                    )
                    .await?;
                Ok(json!({ "players": data.get("people").cloned().unwrap_or(data) }))
            }
            MlbEndpoint::GameLineup => {
                let args: GameArgs = serde_json::from_value(arguments).with_context(invalid)?;
                let data = self
                    .api
                    .get(&format!("game/{}/boxscore", args.game_id), &[])
                    .await?;
                Ok(game_lineup(args.game_id, &data))
            }
        }
    }

    async fn plays(&self, args: PlaysArgs) -> Result<Value> {
        let data = self
            .api
            .get(
                &format!("game/{}/playByPlay", args.game_id),
                &[("timecode", args.timecode), ("fields", args.fields)],
            )
            .await?;

        let all_plays = data
            .get("allPlays")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let plays: Vec<Value> = match args.event_type.as_deref().filter(|t| !t.is_empty()) {
            Some(event_type) => all_plays
                .into_iter()
                .filter(|play| {
                    play.pointer("/result/eventType").and_then(Value::as_str) == Some(event_type)
                })
                .collect(),
            None => all_plays,
        };

        Ok(json!({ "plays": plays }))
    }

    async fn standings(&self, args: StandingsArgs) -> Result<Value> {
        let leagues: &[(&str, League)] = match args.league.to_uppercase().as_str() {
            "AL" => &[("AL", League::American)],
            "NL" => &[("NL", League::National)],
            "BOTH" => &[("AL", League::American), ("NL", League::National)],
            _ => return Err(anyhow!("Invalid league parameter. Use 'AL', 'NL', or 'both'.")),
        };
        let season = args
            .season
            .unwrap_or_else(|| chrono::Local::now().year())
            .to_string();

        let mut standings = serde_json::Map::new();
        for (label, league) in leagues {
            let data = self
                .api
                .get(
                    "standings",
                    &[
                        ("leagueId", Some(league.id().to_string())),
                        ("season", Some(season.clone())),
                        ("standingsTypes", args.standings_types.clone()),
                        ("date", args.date.clone()),
                        ("hydrate", args.hydrate.clone()),
                        ("fields", args.fields.clone()),
                    ],
                )
                .await?;
            standings.insert(
                label.to_string(),
                data.get("records").cloned().unwrap_or(data),
            );
        }

        Ok(json!({ "standings": standings }))
    }

    async fn schedule(&self, args: ScheduleArgs) -> Result<Value> {
        validate_date_range(&args.start_date, &args.end_date)?;
        let team_id = match args.team.as_deref() {
            Some(team) => Some(team_id(team)?),
            None => None,
        };

        let data = self
            .api
            .get(
                "schedule",
                &[
                    ("sportId", Some(args.sport_id.to_string())),
                    ("startDate", Some(args.start_date.clone())),
                    ("endDate", Some(args.end_date.clone())),
                    ("teamId", team_id.map(|id| id.to_string())),
                ],
            )
            .await?;

        let dates = data
            .get("dates")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        if dates.is_empty() {
            return Err(anyhow!(
                "No games found for the given date range ({} to {}).",
                args.start_date,
                args.end_date
            ));
        }

        Ok(json!({ "schedule": dates }))
    }

    async fn search_players(&self, args: SearchPlayersArgs) -> Result<Value> {
        let data = self
            .api
            .get(&format!("sports/{}/players", args.sport_id), &[])
            .await?;

        let wanted = args.fullname.trim().to_lowercase();
        let key = args.search_key.to_lowercase();
        let ids: Vec<Value> = data
            .get("people")
            .and_then(Value::as_array)
            .map(|people| {
                people
                    .iter()
                    .filter(|person| {
                        person
                            .as_object()
                            .and_then(|p| p.iter().find(|(k, _)| k.to_lowercase() == key))
                            .and_then(|(_, v)| v.as_str())
                            .is_some_and(|v| v.to_lowercase() == wanted)
                    })
                    .filter_map(|person| person.get("id").cloned())
                    .collect()
            })
            .unwrap_or_default();

        Ok(json!({ "player_ids": ids }))
    }

    async fn player_stats(&self, args: PlayerStatsArgs) -> Result<Value> {
        let ids = split_ids(&args.player_ids);
        let stats = if args.stat_type.as_deref() == Some("season") {
            "season,seasonAdvanced"
        } else {
            "career"
        };
        let group = args.group.unwrap_or_else(hitting);

        let mut hydrate = vec![format!("group=[{}]", group), format!("type=[{}]", stats)];
        if let Some(season) = args.season {
            hydrate.push(format!("season={}", season));
        }

        let data = self
            .api
            .get(
                "people",
                &[
                    ("personIds", Some(ids.join(","))),
                    ("hydrate", Some(format!("stats({})", hydrate.join(",")))),
                ],
            )
            .await?;

        let splits: Vec<Value> = data
            .get("people")
            .and_then(Value::as_array)
            .map(|people| {
                people
                    .iter()
                    .filter_map(|person| {
                        let stats = person.get("stats")?;
                        Some(json!({
                            "player_id": person.get("id"),
                            "player_name": person.get("fullName"),
                            "stats": stats,
                        }))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(json!({ "player_stats": splits }))
    }

    async fn sabermetrics(&self, args: SabermetricsArgs) -> Result<Value> {
        let ids: Vec<u64> = split_ids(&args.player_ids)
            .iter()
            .map(|id| {
                id.parse::<u64>()
                    .map_err(|_| anyhow!("Invalid player id: {}", id))
            })
            .collect::<Result<_>>()?;

        let data = self
            .api
            .get(
                "stats",
                &[
                    ("stats", Some("sabermetrics".to_string())),
                    ("group", Some(args.group.clone())),
                    ("sportId", Some("1".to_string())),
                    ("season", Some(args.season.to_string())),
                ],
            )
            .await?;

        let groups = data
            .get("stats")
            .and_then(Value::as_array)
            .ok_or_else(|| anyhow!("No stats data found"))?;

        let mut players = Vec::new();
        for split in groups
            .iter()
            .filter_map(|g| g.get("splits").and_then(Value::as_array))
            .flatten()
        {
            let Some(player_id) = split.pointer("/player/id").and_then(Value::as_u64) else {
                continue;
            };
            if !ids.contains(&player_id) {
                continue;
            }

            let mut player = json!({
                "player_id": player_id,
                "player_name": split.pointer("/player/fullName").cloned().unwrap_or(json!("Unknown")),
                "position": split.pointer("/position/abbreviation").cloned().unwrap_or(json!("N/A")),
                "team": split.pointer("/team/name").cloned().unwrap_or(json!("N/A")),
                "team_id": split.pointer("/team/id").cloned().unwrap_or(Value::Null),
            });

            if let Some(stat) = split.get("stat").and_then(Value::as_object) {
                match &args.stat_name {
                    Some(stat_name) => {
                        let found = stat
                            .iter()
                            .find(|(k, _)| k.eq_ignore_ascii_case(stat_name))
                            .map(|(_, v)| v.clone());
                        if found.is_none() {
                            player["available_stats"] =
                                json!(stat.keys().collect::<Vec<_>>());
                        }
                        player[stat_name.as_str()] = found.unwrap_or(Value::Null);
                    }
                    None => player["sabermetrics"] = Value::Object(stat.clone()),
                }
            }

            players.push(player);
        }

        Ok(json!({
            "season": args.season,
            "group": args.group,
            "players": players,
        }))
    }
}

#[async_trait::async_trait]
impl Tool for MlbTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.endpoint.name().to_string(),
            description: self.endpoint.description().to_string(),
            input_schema: self.endpoint.input_schema(),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        match self.run(arguments).await {
            Ok(value) => {
                if let Some(message) = check_result_size(&value, self.endpoint.narrowing_hint()) {
                    return Ok(CallToolResult::error(message));
                }
                Ok(CallToolResult::json(value))
            }
            Err(e) => {
                tracing::debug!(tool = self.endpoint.name(), error = %e, "MLB tool failed");
                Ok(CallToolResult::error(format!("{:#}", e)))
            }
        }
    }
}

/// Both lineups from a boxscore, starters in batting order first
fn game_lineup(game_id: u64, boxscore: &Value) -> Value {
    let mut teams = serde_json::Map::new();

    for side in ["away", "home"] {
        let Some(team) = boxscore.pointer(&format!("/teams/{}", side)) else {
            continue;
        };

        let mut players: Vec<Value> = team
            .get("players")
            .and_then(Value::as_object)
            .map(|players| {
                players
                    .iter()
                    .filter(|(key, _)| key.to_lowercase().starts_with("id"))
                    .map(|(_, player)| lineup_player(player))
                    .collect()
            })
            .unwrap_or_default();
        players.sort_by_key(|p| batting_slot(&p["batting_order"]));

        teams.insert(
            side.to_string(),
            json!({
                "team_name": team.pointer("/team/name").cloned().unwrap_or(json!("Unknown")),
                "team_id": team.pointer("/team/id").cloned().unwrap_or(Value::Null),
                "players": players,
            }),
        );
    }

    json!({ "game_id": game_id, "teams": teams })
}

fn lineup_player(player: &Value) -> Value {
    let positions: Vec<Value> = player
        .get("allPositions")
        .and_then(Value::as_array)
        .map(|all| {
            all.iter()
                .map(|p| json!({ "position": p.get("abbreviation"), "position_name": p.get("name") }))
                .collect()
        })
        .unwrap_or_default();

    let game_entries: Vec<Value> = player
        .get("gameStatus")
        .map(|status| {
            vec![json!({
                "is_on_bench": status.get("isOnBench").and_then(Value::as_bool).unwrap_or(false),
                "is_substitute": status.get("isSubstitute").and_then(Value::as_bool).unwrap_or(false),
                "status": status.get("status"),
            })]
        })
        .unwrap_or_default();

    json!({
        "player_id": player.pointer("/person/id"),
        "player_name": player.pointer("/person/fullName").cloned().unwrap_or(json!("Unknown")),
        "jersey_number": player.get("jerseyNumber"),
        "positions": positions,
        "batting_order": player.get("battingOrder"),
        "game_entries": game_entries,
    })
}

/// Sort key for a boxscore batting order such as "100" (leadoff starter) or
/// "101" (his first substitute): starters, then substitutes, then the rest
fn batting_slot(order: &Value) -> (u8, u32) {
    let order = match order {
        Value::String(s) => s.parse::<u32>().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        _ => None,
    };
    match order {
        Some(o) if o % 100 == 0 => (0, o),
        Some(o) => (1, o),
        None => (2, 0),
    }
}

fn team_id(team: &str) -> Result<u32> {
    resolve_team_id(team).ok_or_else(|| anyhow!("Could not find team ID for '{}'", team))
}

fn split_ids(ids: &str) -> Vec<String> {
    ids.split(',')
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

/// Check that both dates are YYYY-MM-DD and `start <= end`
pub fn validate_date_range(start: &str, end: &str) -> Result<()> {
    let parse = |s: &str| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| anyhow!("Invalid date format '{}': {}", s, e))
    };
    let (start_date, end_date) = (parse(start)?, parse(end)?);
    if start_date > end_date {
        return Err(anyhow!(
            "start_date ({}) must be before or equal to end_date ({})",
            start,
            end
        ));
    }
    Ok(())
}

/// Error message when a result exceeds [`MAX_RESULT_WORDS`]
pub fn check_result_size(value: &Value, hint: &str) -> Option<String> {
    let words = serde_json::to_string(value)
        .map(|s| s.split_whitespace().count())
        .unwrap_or(0);
    (words > MAX_RESULT_WORDS).then(|| {
        format!(
            "Result too large ({} words). Please narrow your query (e.g., shorter date range, specific {}).",
            words, hint
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ToolContent;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn tool_for(server: &MockServer, endpoint: MlbEndpoint) -> MlbTool {
        MlbTool::new(endpoint, StatsApi::with_base_url(server.uri()).unwrap())
    }

    fn error_text(result: &CallToolResult) -> String {
        assert!(result.is_error());
        match &result.content[0] {
            ToolContent::Text { text } => text.clone(),
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn test_all_endpoints_have_unique_names() {
        let mut names: Vec<&str> = MlbEndpoint::ALL.iter().map(|e| e.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 19);
    }

    #[test]
    fn test_validate_date_range() {
        assert!(validate_date_range("2024-04-01", "2024-04-01").is_ok());
        assert!(validate_date_range("2024-04-02", "2024-04-01")
            .unwrap_err()
            .to_string()
            .contains("must be before or equal"));
        assert!(validate_date_range("04/01/2024", "2024-04-01")
            .unwrap_err()
            .to_string()
            .starts_with("Invalid date format"));
    }

    #[test]
    fn test_result_size_limit() {
        assert!(check_result_size(&json!({"a": 1}), "team").is_none());

        // Compact JSON has no whitespace between tokens, so only text counts
        let numbers = Value::Array((0..MAX_RESULT_WORDS).map(|i| json!(i)).collect());
        assert!(check_result_size(&numbers, "team").is_none());

        let big = Value::Array((0..MAX_RESULT_WORDS).map(|_| json!("two words")).collect());
        let message = check_result_size(&big, "team").unwrap();
        assert!(message.starts_with("Result too large"));
        assert!(message.contains("specific team"));
    }

    #[tokio::test]
    async fn test_standings_queries_each_league() {
        let server = MockServer::start().await;
        for league in ["103", "104"] {
            Mock::given(method("GET"))
                .and(path("/standings"))
                .and(query_param("leagueId", league))
                .and(query_param("season", "2024"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({ "records": [{ "league": league }] })),
                )
                .expect(1)
                .mount(&server)
                .await;
        }

        let tool = tool_for(&server, MlbEndpoint::Standings).await;
        let result = tool.execute(json!({"season": 2024})).await.unwrap();
        let value = result.structured_content.unwrap();
        assert_eq!(value["standings"]["AL"][0]["league"], "103");
        assert_eq!(value["standings"]["NL"][0]["league"], "104");
    }

    #[tokio::test]
    async fn test_standings_rejects_unknown_league() {
        let server = MockServer::start().await;
        let tool = tool_for(&server, MlbEndpoint::Standings).await;
        let result = tool.execute(json!({"league": "KBO"})).await.unwrap();
        assert!(error_text(&result).contains("Invalid league parameter"));
    }

    #[tokio::test]
    async fn test_schedule_resolves_team_and_validates_dates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/schedule"))
            .and(query_param("teamId", "119"))
            .and(query_param("startDate", "2024-07-01"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "dates": [{ "date": "2024-07-01" }] })),
            )
            .mount(&server)
            .await;

        let tool = tool_for(&server, MlbEndpoint::Schedule).await;
        let ok = tool
            .execute(json!({"start_date": "2024-07-01", "end_date": "2024-07-02", "team": "LAD"}))
            .await
            .unwrap();
        assert_eq!(ok.structured_content.unwrap()["schedule"][0]["date"], "2024-07-01");

        let bad = tool
            .execute(json!({"start_date": "2024-07-03", "end_date": "2024-07-02"}))
            .await
            .unwrap();
        assert!(error_text(&bad).contains("must be before or equal"));
    }

    #[tokio::test]
    async fn test_schedule_without_games_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/schedule"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "dates": [] })))
            .mount(&server)
            .await;

        let tool = tool_for(&server, MlbEndpoint::Schedule).await;
        let result = tool
            .execute(json!({"start_date": "2024-12-24", "end_date": "2024-12-25"}))
            .await
            .unwrap();
        assert!(error_text(&result).starts_with("Error: No games found"));
    }

    #[tokio::test]
    async fn test_roster_unknown_team() {
        let server = MockServer::start().await;
        let tool = tool_for(&server, MlbEndpoint::Roster).await;
        let result = tool.execute(json!({"team": "Hanwha Eagles"})).await.unwrap();
        assert!(error_text(&result).contains("Could not find team ID for 'Hanwha Eagles'"));
    }

    #[tokio::test]
    async fn test_missing_required_argument() {
        let server = MockServer::start().await;
        let tool = tool_for(&server, MlbEndpoint::PlayerInfo).await;
        let result = tool.execute(json!({})).await.unwrap();
        assert!(error_text(&result).contains("Invalid arguments for get_mlb_player_info"));
    }

    #[tokio::test]
    async fn test_search_players_matches_full_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sports/1/players"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "people": [
                    { "id": 660271, "fullName": "Shohei Ohtani" },
                    { "id": 592450, "fullName": "Aaron Judge" }
                ]
            })))
            .mount(&server)
            .await;

        let tool = tool_for(&server, MlbEndpoint::SearchPlayers).await;
        let result = tool.execute(json!({"fullname": "shohei ohtani"})).await.unwrap();
        assert_eq!(
            result.structured_content.unwrap()["player_ids"],
            json!([660271])
        );
    }

    #[tokio::test]
    async fn test_search_teams_is_local() {
        let server = MockServer::start().await;
        let tool = tool_for(&server, MlbEndpoint::SearchTeams).await;
        let result = tool.execute(json!({"team_name": "new york"})).await.unwrap();
        let teams = result.structured_content.unwrap()["teams"].clone();
        assert_eq!(teams.as_array().unwrap().len(), 2);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_player_stats_hydrate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/people"))
            .and(query_param("personIds", "660271,592450"))
            .and(query_param(
                "hydrate",
                "stats(group=[pitching],type=[season,seasonAdvanced],season=2024)",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "people": [
                    { "id": 660271, "fullName": "Shohei Ohtani", "stats": [{ "splits": [] }] },
                    { "id": 592450, "fullName": "Aaron Judge" }
                ]
            })))
            .mount(&server)
            .await;

        let tool = tool_for(&server, MlbEndpoint::MultiplePlayerStats).await;
        let result = tool
            .execute(json!({
                "player_ids": "660271, 592450",
                "group": "pitching",
                "type": "season",
                "season": 2024
            }))
            .await
            .unwrap();
        let stats = result.structured_content.unwrap()["player_stats"].clone();
        assert_eq!(stats.as_array().unwrap().len(), 1);
        assert_eq!(stats[0]["player_id"], 660271);
    }

    #[tokio::test]
    async fn test_sabermetrics_filters_players_and_stat() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stats"))
            .and(query_param("stats", "sabermetrics"))
            .and(query_param("season", "2024"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "stats": [{
                    "splits": [
                        {
                            "player": { "id": 592450, "fullName": "Aaron Judge" },
                            "team": { "id": 147, "name": "New York Yankees" },
                            "position": { "abbreviation": "RF" },
                            "stat": { "war": 10.8, "woba": 0.476 }
                        },
                        {
                            "player": { "id": 1, "fullName": "Someone Else" },
                            "stat": { "war": 0.1 }
                        }
                    ]
                }]
            })))
            .mount(&server)
            .await;

        let tool = tool_for(&server, MlbEndpoint::Sabermetrics).await;
        let result = tool
            .execute(json!({"player_ids": "592450", "season": 2024, "stat_name": "WAR"}))
            .await
            .unwrap();
        let value = result.structured_content.unwrap();
        assert_eq!(value["players"].as_array().unwrap().len(), 1);
        assert_eq!(value["players"][0]["WAR"], 10.8);
        assert_eq!(value["players"][0]["team_id"], 147);
    }

    #[tokio::test]
    async fn test_game_highlights() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/game/745444/content"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "editorial": {},
                "highlights": { "highlights": { "items": [{ "headline": "Ohtani homers" }] } }
            })))
            .mount(&server)
            .await;

        let tool = tool_for(&server, MlbEndpoint::GameHighlights).await;
        let result = tool.execute(json!({"game_id": 745444})).await.unwrap();
        let value = result.structured_content.unwrap();
        assert_eq!(
            value["highlights"]["highlights"]["items"][0]["headline"],
            "Ohtani homers"
        );
        assert!(value.get("editorial").is_none());
    }

    #[tokio::test]
    async fn test_game_pace_requires_season() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gamePace"))
            .and(query_param("season", "2024"))
            .and(query_param("sportId", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sports": [{ "timePerGame": "02:36:00" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tool = tool_for(&server, MlbEndpoint::GamePace).await;
        let result = tool.execute(json!({"season": 2024})).await.unwrap();
        assert_eq!(
            result.structured_content.unwrap()["game_pace"]["sports"][0]["timePerGame"],
            "02:36:00"
        );

        let missing = tool.execute(json!({})).await.unwrap();
        assert!(error_text(&missing).contains("Invalid arguments for get_mlb_game_pace"));
    }

    #[tokio::test]
    async fn test_game_scoring_plays_filters_event_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/game/745444/playByPlay"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "allPlays": [
                    { "result": { "eventType": "strikeout" } },
                    { "result": { "eventType": "home_run", "rbi": 2 } },
                    { "result": { "eventType": "single" } }
                ]
            })))
            .mount(&server)
            .await;

        let tool = tool_for(&server, MlbEndpoint::GameScoringPlays).await;
        let homers = tool
            .execute(json!({"game_id": 745444, "eventType": "home_run"}))
            .await
            .unwrap()
            .structured_content
            .unwrap();
        assert_eq!(homers["plays"].as_array().unwrap().len(), 1);
        assert_eq!(homers["plays"][0]["result"]["rbi"], 2);

        let all = tool
            .execute(json!({"game_id": 745444}))
            .await
            .unwrap()
            .structured_content
            .unwrap();
        assert_eq!(all["plays"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_players_for_season() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sports/1/players"))
            .and(query_param("season", "2024"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "people": [{ "id": 660271, "fullName": "Shohei Ohtani" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tool = tool_for(&server, MlbEndpoint::Players).await;
        let result = tool.execute(json!({"season": 2024})).await.unwrap();
        assert_eq!(
            result.structured_content.unwrap()["players"][0]["fullName"],
            "Shohei Ohtani"
        );
    }

    #[tokio::test]
    async fn test_game_lineup_orders_starters_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/game/745444/boxscore"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "teams": {
                    "away": {
                        "team": { "id": 147, "name": "New York Yankees" },
                        "players": {
                            "ID1": {
                                "person": { "id": 1, "fullName": "Bench Arm" },
                                "allPositions": [{ "abbreviation": "P", "name": "Pitcher" }]
                            },
                            "ID2": {
                                "person": { "id": 2, "fullName": "Pinch Hitter" },
                                "battingOrder": "201",
                                "gameStatus": { "isOnBench": false, "isSubstitute": true }
                            },
                            "ID3": {
                                "person": { "id": 3, "fullName": "Number Two" },
                                "jerseyNumber": "99",
                                "battingOrder": "200",
                                "allPositions": [{ "abbreviation": "RF", "name": "Outfielder" }]
                            },
                            "ID4": {
                                "person": { "id": 4, "fullName": "Leadoff" },
                                "battingOrder": "100"
                            }
                        }
                    },
                    "home": {
                        "team": { "id": 119, "name": "Los Angeles Dodgers" },
                        "players": {}
                    }
                }
            })))
            .mount(&server)
            .await;

        let tool = tool_for(&server, MlbEndpoint::GameLineup).await;
        let value = tool
            .execute(json!({"game_id": 745444}))
            .await
            .unwrap()
            .structured_content
            .unwrap();

        assert_eq!(value["game_id"], 745444);
        let away = &value["teams"]["away"];
        assert_eq!(away["team_name"], "New York Yankees");
        let order: Vec<&str> = away["players"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["player_name"].as_str().unwrap())
            .collect();
        assert_eq!(order, vec!["Leadoff", "Number Two", "Pinch Hitter", "Bench Arm"]);
        assert_eq!(away["players"][1]["jersey_number"], "99");
        assert_eq!(away["players"][1]["positions"][0]["position"], "RF");
        assert_eq!(away["players"][2]["game_entries"][0]["is_substitute"], true);
        assert_eq!(value["teams"]["home"]["team_id"], 119);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_tool_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let tool = tool_for(&server, MlbEndpoint::Draft).await;
        let result = tool.execute(json!({"year_id": 2024})).await.unwrap();
        assert!(error_text(&result).contains("Stats API error: 500"));
    }
}
