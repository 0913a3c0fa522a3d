use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use swiss_arbiter::{
    Outcome, PairingMethod, RoundAdvance, TournamentConfig, TournamentManager,
};

/// Helper to create a started tournament with N registered players.
fn setup_tournament(n_players: usize, method: PairingMethod) -> (TournamentManager, u64) {
    let mut manager = TournamentManager::new();
    let tournament = manager
        .create_tournament(TournamentConfig::new("bench", 1, method))
        .expect("valid config");
    for i in 0..n_players {
        let player = manager.add_player(format!("player{i}"), 1200 + (i as i32 * 7) % 800);
        manager
            .register_player(tournament, player)
            .expect("registration open");
    }
    manager.start_tournament(tournament).expect("start");
    (manager, tournament)
}

/// Play every undecided game of the current round as a white win.
fn decide_current_round(manager: &mut TournamentManager, tournament: u64) {
    let games = manager.current_round_games(tournament).expect("games");
    for game in games {
        if game.outcome.is_none() {
            manager
                .record_outcome(game.id, Outcome::WhiteWin)
                .expect("undecided");
        }
    }
}

/// Benchmark first-round generation across field sizes.
fn bench_first_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_round");
    for n_players in [16, 64, 256] {
        group.bench_with_input(
            BenchmarkId::from_parameter(n_players),
            &n_players,
            |b, &n| {
                b.iter(|| setup_tournament(n, PairingMethod::Massacre));
            },
        );
    }
    group.finish();
}

/// Benchmark Swiss pairing of a mid-tournament round.
fn bench_swiss_round(c: &mut Criterion) {
    c.bench_function("swiss_round_64_players", |b| {
        b.iter(|| {
            let (mut manager, tournament) = setup_tournament(64, PairingMethod::Massacre);
            decide_current_round(&mut manager, tournament);
            manager.advance_round(tournament).expect("round two");
        });
    });
}

/// Benchmark a complete tournament: all rounds, standings and ratings.
fn bench_whole_tournament(c: &mut Criterion) {
    c.bench_function("whole_tournament_32_players", |b| {
        b.iter(|| {
            let (mut manager, tournament) = setup_tournament(32, PairingMethod::CrossGroup);
            loop {
                decide_current_round(&mut manager, tournament);
                match manager.advance_round(tournament).expect("advance") {
                    RoundAdvance::RoundGenerated(_) => {}
                    RoundAdvance::Finished => break,
                }
            }
            manager.standings(tournament).expect("standings")
        });
    });
}

criterion_group!(
    benches,
    bench_first_round,
    bench_swiss_round,
    bench_whole_tournament
);
criterion_main!(benches);
