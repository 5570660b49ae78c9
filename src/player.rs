use crate::error::MapError;
use crate::map::TileGrid;
use crate::vector::{renormalize_if_drifted, Rotate, RotationMatrix2};
use glam::DVec2;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Player {
    position: DVec2,
    orientation: DVec2,
    /// Rotation taking `+x` to `orientation`, refreshed on every update.
    rotation: RotationMatrix2,
    pub move_speed: f64,
    /// Half-angle tangent turned per tick.
    pub rotation_speed: f64,
}

impl Player {
    /// `facing` is normalized; spawning inside a solid tile is an error.
    pub fn new(
        position: DVec2,
        facing: DVec2,
        move_speed: f64,
        rotation_speed: f64,
        grid: &TileGrid,
    ) -> Result<Self, MapError> {
        if grid.is_solid_at(position.x, position.y) {
            return Err(MapError::SolidSpawn {
                x: position.x,
                y: position.y,
            });
        }

        let orientation = facing.normalize_or_zero();
        if orientation == DVec2::ZERO {
            return Err(MapError::ZeroFacing);
        }

        Ok(Self {
            position,
            orientation,
            rotation: RotationMatrix2::from_unit(orientation),
            move_speed,
            rotation_speed,
        })
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    /// Unit view direction.
    pub fn orientation(&self) -> DVec2 {
        self.orientation
    }

    pub fn rotation(&self) -> &RotationMatrix2 {
        &self.rotation
    }

    /// Displacement for one tick of walking in direction `walk`.
    pub fn step(&self, walk: i8) -> DVec2 {
        self.orientation * (walk as f64 * self.move_speed)
    }

    /// Integrate one tick of turning and walking. A step that would end
    /// inside a solid tile is dropped as a whole; there is no sliding along
    /// walls, so the player can get stuck on corners.
    pub fn update(&mut self, turn: i8, walk: i8, grid: &TileGrid) {
        if turn != 0 {
            let mut turned = self.orientation;
            turned.rotate_by_amount(turn as f64 * self.rotation_speed);
            renormalize_if_drifted(&mut turned);
            if turned.is_finite() {
                self.orientation = turned;
            } else {
                log::warn!(
                    "turn rate {} gives no usable direction, keeping {}",
                    self.rotation_speed,
                    self.orientation
                );
            }
        }
        self.rotation = RotationMatrix2::from_unit(self.orientation);

        if walk == 0 {
            return;
        }

        let tentative = self.position + self.step(walk);
        if grid.is_solid_at(tentative.x, tentative.y) {
            log::trace!("blocked move to {tentative}");
        } else {
            self.position = tentative;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> TileGrid {
        TileGrid::new(
            64.,
            vec![
                vec![1, 1, 1, 1],
                vec![1, 0, 0, 1],
                vec![1, 0, 1, 1],
                vec![1, 1, 1, 1],
            ],
        )
        .unwrap()
    }

    fn player(grid: &TileGrid) -> Player {
        Player::new(DVec2::new(96., 96.), DVec2::Y, 4., 0.03, grid).unwrap()
    }

    #[test]
    fn zero_intent_changes_nothing() {
        let grid = room();
        let mut p = player(&grid);
        p.update(1, 0, &grid);
        let before = p;

        for _ in 0..1_000 {
            p.update(0, 0, &grid);
        }
        assert_eq!(p.position(), before.position());
        assert_eq!(p.orientation(), before.orientation());
        assert_eq!(p.rotation(), before.rotation());
    }

    #[test]
    fn walks_along_orientation() {
        let grid = room();
        let mut p = player(&grid);
        p.update(0, 1, &grid);
        assert_eq!(p.position(), DVec2::new(96., 100.));
        p.update(0, -1, &grid);
        assert_eq!(p.position(), DVec2::new(96., 96.));
    }

    #[test]
    fn blocked_by_walls() {
        let grid = room();
        let mut p = Player::new(DVec2::new(96., 96.), DVec2::Y, 40., 0.03, &grid).unwrap();
        // two steps stay inside the empty cell (1, 2), the third would end
        // in the bottom border
        p.update(0, 1, &grid);
        p.update(0, 1, &grid);
        assert_eq!(p.position(), DVec2::new(96., 176.));
        p.update(0, 1, &grid);
        assert_eq!(p.position(), DVec2::new(96., 176.));
        assert!(!grid.is_solid_at(p.position().x, p.position().y));
    }

    #[test]
    fn diagonal_step_is_all_or_nothing() {
        let grid = room();
        // facing down-right from near the right wall of cell (1, 1): the x
        // part alone would be fine, the combined step ends in cell (2, 2)
        let mut p = Player::new(
            DVec2::new(120., 120.),
            DVec2::new(1., 1.),
            20.,
            0.03,
            &grid,
        )
        .unwrap();
        p.update(0, 1, &grid);
        assert_eq!(p.position(), DVec2::new(120., 120.));
    }

    #[test]
    fn turning_keeps_a_unit_orientation() {
        let grid = room();
        let mut p = player(&grid);
        for _ in 0..50_000 {
            p.update(1, 0, &grid);
        }
        assert!((p.orientation().length_squared() - 1.).abs() <= crate::vector::DRIFT_TOLERANCE);
        assert!((p.rotation().apply(DVec2::X) - p.orientation()).length() < 1e-15);
    }

    #[test]
    fn turning_right_then_left_returns() {
        let grid = room();
        let mut p = player(&grid);
        for _ in 0..10 {
            p.update(1, 0, &grid);
        }
        for _ in 0..10 {
            p.update(-1, 0, &grid);
        }
        assert!((p.orientation() - DVec2::Y).length() < 1e-12);
    }

    #[test]
    fn overflowing_turn_rate_keeps_the_old_orientation() {
        let grid = room();
        let mut p = player(&grid);
        p.rotation_speed = 1e200;

        p.update(1, 1, &grid);
        assert_eq!(p.orientation(), DVec2::Y);
        assert!(p.rotation().apply(DVec2::X).is_finite());
        // the walk still happens along the kept direction
        assert_eq!(p.position(), DVec2::new(96., 100.));
    }

    #[test]
    fn rejects_bad_spawns() {
        let grid = room();
        assert!(matches!(
            Player::new(DVec2::new(10., 10.), DVec2::Y, 1., 1., &grid),
            Err(MapError::SolidSpawn { .. })
        ));
        assert!(matches!(
            Player::new(DVec2::new(96., 96.), DVec2::ZERO, 1., 1., &grid),
            Err(MapError::ZeroFacing)
        ));
    }
}
