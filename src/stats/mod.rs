// Statistics engines: standings, player leaderboard, GWG resolution,
// playoff series tracking, and special-teams efficiency.

pub mod efficiency;
pub mod gwg;
pub mod players;
pub mod playoffs;
pub mod standings;
