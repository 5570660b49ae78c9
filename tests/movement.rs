use glam::DVec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayscape::vector::DRIFT_TOLERANCE;
use rayscape::{Player, TileGrid};

fn random_grid(rng: &mut StdRng, cols: usize, rows: usize) -> TileGrid {
    let mut codes = vec![vec![0u8; cols]; rows];
    for (row, line) in codes.iter_mut().enumerate() {
        for (col, code) in line.iter_mut().enumerate() {
            let border = row == 0 || col == 0 || row + 1 == rows || col + 1 == cols;
            if border || rng.gen_bool(0.25) {
                *code = rng.gen_range(1..=9);
            }
        }
    }
    // keep the spawn cell open
    codes[1][1] = 0;
    TileGrid::new(32., codes).unwrap()
}

#[test]
fn never_ends_up_inside_a_wall() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..50 {
        let grid = random_grid(&mut rng, 12, 9);
        let speed = rng.gen_range(1.0..40.0);
        let mut player = Player::new(grid.cell_center(1, 1), DVec2::X, speed, 0.2, &grid).unwrap();

        for _ in 0..500 {
            let turn = rng.gen_range(-1..=1);
            let walk = rng.gen_range(-1..=1);
            player.update(turn, walk, &grid);

            let position = player.position();
            assert!(
                !grid.is_solid_at(position.x, position.y),
                "moved into a wall at {position}"
            );
            assert!((player.orientation().length_squared() - 1.).abs() <= DRIFT_TOLERANCE);
        }
    }
}

#[test]
fn idle_player_stays_put() {
    let mut rng = StdRng::seed_from_u64(7);
    let grid = random_grid(&mut rng, 8, 8);
    let mut player = Player::new(grid.cell_center(1, 1), DVec2::new(0.3, -0.7), 3., 0.1, &grid).unwrap();

    // wander a bit so the state is not a round number
    for _ in 0..100 {
        player.update(rng.gen_range(-1..=1), rng.gen_range(-1..=1), &grid);
    }

    let before = player;
    for _ in 0..1_000 {
        player.update(0, 0, &grid);
    }
    assert_eq!(player, before);
}
