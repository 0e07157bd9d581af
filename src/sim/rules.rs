//! Serve/score rules and collision resolution
//!
//! Turns contacts reported by the physics step into match consequences:
//! strikes, net touches, points, and the transitions out of a scored point.

use glam::Vec2;

use super::ai;
use super::collision::{circle_aabb_collision, strike_velocity_x};
use super::physics::{Contacts, clamp_speed};
use super::state::{GameEvent, MatchPhase, MatchState, Side};
use crate::consts::*;

/// Default vertical impulse of a strike
const STRIKE_LIFT: f32 = -1200.0;
/// Players near the net top get pushed back this fast
const ANTI_CAMP_PUSH: f32 = 200.0;

impl MatchState {
    /// Put the hanging ball in play with the given velocity
    pub fn launch_serve(&mut self, vel: Vec2) {
        let cap = self.profile.max_ball_speed;
        let ball = self.primary_ball_mut();
        ball.gravity_enabled = true;
        ball.vel = clamp_speed(vel, cap);
        ball.angular_vel = vel.x * 2.0;
        self.phase = MatchPhase::Rallying;
        log::debug!("Serve launched by player {}", self.serving_side.number());
    }

    /// Launch the serve high toward the opponent. Returns false outside a serve.
    pub fn serve_ball(&mut self) -> bool {
        let MatchPhase::Serving { side } = self.phase else {
            return false;
        };
        self.primary_ball_mut().serve(side.forward());
        self.phase = MatchPhase::Rallying;
        true
    }

    /// Flip the pause flag. Finished matches cannot be paused.
    pub fn toggle_pause(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.paused = !self.paused;
        log::info!("{}", if self.paused { "Paused" } else { "Resumed" });
        self.events.push(GameEvent::Paused(self.paused));
        true
    }

    /// Keep players on their own half and inside the walls
    pub fn enforce_court_bounds(&mut self) {
        let court = self.court;
        let danger_y = court.net_top + 80.0;

        for side in [Side::One, Side::Two] {
            let player = self.player_mut(side);
            let half = player.half;
            match side {
                Side::One => {
                    let limit = court.left_limit(half.x);
                    if player.pos.x > limit {
                        player.pos.x = limit;
                        player.vel.x = player.vel.x.min(0.0);
                    }
                    if player.pos.y < danger_y && player.pos.x > limit - 50.0 {
                        player.vel.x = -ANTI_CAMP_PUSH;
                        player.pos.x -= 5.0;
                    }
                    if player.pos.x < PLAYER_WALL_MARGIN {
                        player.pos.x = PLAYER_WALL_MARGIN;
                        player.vel.x = player.vel.x.max(0.0);
                    }
                }
                Side::Two => {
                    let limit = court.right_limit(half.x);
                    if player.pos.x < limit {
                        player.pos.x = limit;
                        player.vel.x = player.vel.x.max(0.0);
                    }
                    if player.pos.y < danger_y && player.pos.x < limit + 50.0 {
                        player.vel.x = ANTI_CAMP_PUSH;
                        player.pos.x += 5.0;
                    }
                    if player.pos.x > WIDTH - PLAYER_WALL_MARGIN {
                        player.pos.x = WIDTH - PLAYER_WALL_MARGIN;
                        player.vel.x = player.vel.x.min(0.0);
                    }
                }
            }
            if player.pos.y > PLAYER_MAX_Y {
                player.pos.y = PLAYER_MAX_Y;
                player.vel.y = player.vel.y.min(0.0);
            }
        }
    }

    /// Apply what every ball ran into during its physics step
    ///
    /// `contacts` is indexed like `balls`. Static contacts (net, ground) resolve
    /// first, then strikes against each player.
    pub fn resolve_ball_contacts(&mut self, contacts: &[Contacts]) {
        let ids: Vec<u32> = self.balls.iter().map(|b| b.id).collect();

        for (id, contact) in ids.into_iter().zip(contacts.iter().copied()) {
            if contact.net {
                self.events.push(GameEvent::NetHit);
            }
            if contact.ground && self.handle_floor_contact(id) {
                continue;
            }
            for side in [Side::One, Side::Two] {
                self.try_strike(id, side);
            }
        }
    }

    /// A ball touched the ground. Returns true if the ball left play.
    pub fn handle_floor_contact(&mut self, id: u32) -> bool {
        let Some(index) = self.ball_index(id) else {
            return true;
        };
        // The hanging serve ball and anything after the point just bounce
        if self.phase != MatchPhase::Rallying {
            return false;
        }
        if self.balls[index].extra {
            return self.remove_extra_ball(id);
        }

        let scorer = Side::court_of(self.balls[index].pos.x).opponent();
        self.score[scorer.index()] += 1;
        self.serving_side = scorer.opponent();
        self.phase = MatchPhase::PointScored { scorer };
        self.stats.end_rally();
        self.events.push(GameEvent::FloorScored(scorer));
        log::info!(
            "Point to player {} ({} - {})",
            scorer.number(),
            self.score[0],
            self.score[1]
        );
        true
    }

    /// Strike ball `id` if it overlaps `side`'s player
    pub fn try_strike(&mut self, id: u32, side: Side) -> bool {
        if self.is_finished() || matches!(self.phase, MatchPhase::PointScored { .. }) {
            return false;
        }
        let Some(index) = self.ball_index(id) else {
            return false;
        };
        let ball = &self.balls[index];
        if !ball.can_be_struck() {
            return false;
        }
        let player = self.player(side);
        let hit = circle_aabb_collision(ball.pos, ball.radius, &player.collider());
        if !hit.hit {
            return false;
        }

        let mut vx = strike_velocity_x(ball.vel.x, ball.pos.x, player.pos.x, player.vel.x);
        let mut vy = STRIKE_LIFT;
        if side == Side::Two {
            let tuning = self.profile.ai;
            vx = ai::aim_strike(vx, ball.pos.x, &tuning, &mut self.rng);
            vy = tuning.hit_lift;
            self.ai.desperate_save_attempt = false;
        }

        if self.is_serving() {
            self.phase = MatchPhase::Rallying;
            self.balls[index].gravity_enabled = true;
            log::debug!("Player {} served", side.number());
        }

        let cap = self.profile.max_ball_speed;
        let ball = &mut self.balls[index];
        ball.pos += hit.normal * hit.penetration;
        ball.vel = clamp_speed(Vec2::new(vx, vy) * ball.speed_multiplier, cap);
        ball.angular_vel = vx * 2.0;
        ball.mark_struck();

        self.last_hitter = Some(side);
        self.stats.record_hit(side);
        self.events.push(GameEvent::PlayerHit(side));
        true
    }

    /// Resolve a scored point: end the match or set up the next serve
    pub fn apply_transitions(&mut self) {
        let MatchPhase::PointScored { scorer } = self.phase else {
            return;
        };
        if self.score[scorer.index()] >= MAX_SCORE {
            self.phase = MatchPhase::GameOver { winner: scorer };
            self.scheduler.cancel_all();
            self.events.push(GameEvent::GameOver(scorer));
            log::info!(
                "Game over: player {} wins {} - {} (longest rally {}, {} hits)",
                scorer.number(),
                self.score[0],
                self.score[1],
                self.stats.longest_rally,
                self.stats.total_hits()
            );
        } else {
            self.reset_round();
        }
    }

    /// Set up the next serve for `serving_side`
    ///
    /// Clears what a rally may have left behind: extra balls and the
    /// controller's memory. Timed effects run to their own end time.
    pub fn reset_round(&mut self) {
        if self.is_finished() {
            return;
        }
        let side = self.serving_side;
        self.phase = MatchPhase::Serving { side };
        self.last_hitter = Some(side);

        if side == Side::Two {
            self.player_mut(Side::Two)
                .place(Vec2::new(WIDTH * 0.8, GROUND_Y - 100.0));
        }
        let ai_x = self.player(Side::Two).pos.x;
        self.ai.reset(ai_x);
        if side == Side::Two {
            // The serve time limit counts from here
            self.ai.serve_start_ms = Some(self.now_ms());
        }

        self.clear_multiball();
        self.primary_ball_mut().reset(side.serve_position());
        log::debug!("Round reset, player {} serves", side.number());
    }

    /// Tear the match down: nothing scheduled survives
    pub fn shutdown(&mut self) {
        if self.phase == MatchPhase::Stopped {
            return;
        }
        self.scheduler.cancel_all();
        self.clear_multiball();
        self.power_up = None;
        for s in [Side::One, Side::Two] {
            self.effects[s.index()] = Default::default();
            self.player_mut(s).speed_multiplier = 1.0;
        }
        let ai_x = self.player(Side::Two).pos.x;
        self.ai.reset(ai_x);
        self.phase = MatchPhase::Stopped;
        log::info!("Match shut down at {} - {}", self.score[0], self.score[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::LevelKind;
    use crate::sim::powerup::EffectKind;
    use proptest::prelude::*;

    fn rallying() -> MatchState {
        let mut state = MatchState::start_match(LevelKind::Beach, 21);
        state.phase = MatchPhase::Rallying;
        state.primary_ball_mut().gravity_enabled = true;
        state
    }

    fn ground_contact() -> Contacts {
        Contacts {
            ground: true,
            blocked_down: true,
            ..Contacts::default()
        }
    }

    #[test]
    fn test_floor_on_left_scores_for_two() {
        let mut state = rallying();
        state.primary_ball_mut().pos = Vec2::new(300.0, GROUND_Y - 34.0);
        state.resolve_ball_contacts(&[ground_contact()]);
        assert_eq!(state.score, [0, 1]);
        assert_eq!(state.serving_side, Side::One);
        assert_eq!(state.phase, MatchPhase::PointScored { scorer: Side::Two });
        assert!(state.events.contains(&GameEvent::FloorScored(Side::Two)));

        state.apply_transitions();
        assert_eq!(state.phase, MatchPhase::Serving { side: Side::One });
        assert_eq!(state.primary_ball().pos, Side::One.serve_position());
        assert!(!state.primary_ball().gravity_enabled);
    }

    #[test]
    fn test_floor_on_right_scores_for_one() {
        let mut state = rallying();
        state.primary_ball_mut().pos = Vec2::new(1500.0, GROUND_Y - 34.0);
        state.resolve_ball_contacts(&[ground_contact()]);
        assert_eq!(state.score, [1, 0]);
        assert_eq!(state.serving_side, Side::Two);
        state.apply_transitions();
        assert_eq!(state.player(Side::Two).pos, Vec2::new(WIDTH * 0.8, GROUND_Y - 100.0));
    }

    #[test]
    fn test_serve_ball_bounces_without_scoring() {
        let mut state = MatchState::start_match(LevelKind::Beach, 21);
        assert!(!state.handle_floor_contact(state.primary_ball().id));
        assert_eq!(state.score, [0, 0]);
        assert!(state.is_serving());
    }

    #[test]
    fn test_extra_ball_floor_removes_without_scoring() {
        let mut state = rallying();
        state.activate_multiball();
        let extra = state.balls[1].id;
        assert!(state.handle_floor_contact(extra));
        assert_eq!(state.score, [0, 0]);
        assert_eq!(state.phase, MatchPhase::Rallying);
        assert_eq!(state.balls.len(), 2);
    }

    #[test]
    fn test_reaching_max_score_ends_match() {
        let mut state = rallying();
        state.score = [MAX_SCORE - 1, 3];
        state.primary_ball_mut().pos = Vec2::new(1500.0, GROUND_Y - 34.0);
        state.resolve_ball_contacts(&[ground_contact()]);
        state.apply_transitions();

        assert_eq!(state.phase, MatchPhase::GameOver { winner: Side::One });
        assert_eq!(state.winner(), Some(Side::One));
        assert!(state.scheduler.is_empty());
        assert!(state.events.contains(&GameEvent::GameOver(Side::One)));
        // Nothing resets once the match is over
        state.reset_round();
        assert!(state.is_finished());
    }

    #[test]
    fn test_strike_sends_ball_up_and_records_hitter() {
        let mut state = rallying();
        let p1 = state.player(Side::One).pos;
        let half = state.player(Side::One).half;
        let ball = state.primary_ball_mut();
        ball.pos = Vec2::new(p1.x + 10.0, p1.y - half.y - 20.0);
        ball.vel = Vec2::new(0.0, 400.0);
        let id = ball.id;

        assert!(state.try_strike(id, Side::One));
        let ball = state.primary_ball();
        assert!(ball.vel.y < 0.0);
        assert!(ball.vel.x > 0.0);
        assert!(ball.speed() <= state.profile.max_ball_speed + 0.01);
        assert!(!ball.can_be_struck());
        assert_eq!(state.last_hitter, Some(Side::One));
        assert_eq!(state.stats.current_rally, 1);

        // Cooldown blocks an immediate second strike
        assert!(!state.try_strike(id, Side::One));
    }

    #[test]
    fn test_first_strike_starts_rally() {
        let mut state = MatchState::start_match(LevelKind::Beach, 21);
        let serve = state.primary_ball().pos;
        let half = state.player(Side::One).half;
        state.player_mut(Side::One).pos = Vec2::new(serve.x, serve.y + half.y + 20.0);
        let id = state.primary_ball().id;

        assert!(state.try_strike(id, Side::One));
        assert_eq!(state.phase, MatchPhase::Rallying);
        assert!(state.primary_ball().gravity_enabled);
    }

    #[test]
    fn test_ai_strike_heads_for_opponent() {
        let mut state = rallying();
        let p2 = state.player(Side::Two).pos;
        let half = state.player(Side::Two).half;
        let ball = state.primary_ball_mut();
        // Struck on the far edge, which would push it further right
        ball.pos = Vec2::new(p2.x + half.x, p2.y - half.y - 10.0);
        ball.vel = Vec2::new(300.0, 300.0);
        let id = ball.id;
        state.ai.desperate_save_attempt = true;

        assert!(state.try_strike(id, Side::Two));
        assert!(state.primary_ball().vel.x < 0.0);
        assert!(!state.ai.desperate_save_attempt);
    }

    #[test]
    fn test_court_bounds() {
        let mut state = rallying();
        state.player_mut(Side::One).pos.x = NET_X;
        state.player_mut(Side::One).vel.x = 500.0;
        state.player_mut(Side::Two).pos.x = WIDTH - 10.0;
        state.enforce_court_bounds();

        let limit = state.court.left_limit(state.player(Side::One).half.x);
        assert_eq!(state.player(Side::One).pos.x, limit);
        assert_eq!(state.player(Side::One).vel.x, 0.0);
        assert_eq!(state.player(Side::Two).pos.x, WIDTH - PLAYER_WALL_MARGIN);
    }

    #[test]
    fn test_anti_camping_pushes_back_from_net() {
        let mut state = rallying();
        let limit = state.court.left_limit(state.player(Side::One).half.x);
        let player = state.player_mut(Side::One);
        player.pos = Vec2::new(limit - 10.0, 300.0);
        state.enforce_court_bounds();
        let player = state.player(Side::One);
        assert_eq!(player.vel.x, -ANTI_CAMP_PUSH);
        assert_eq!(player.pos.x, limit - 15.0);
    }

    #[test]
    fn test_reset_round_clears_rally_leftovers() {
        let mut state = rallying();
        state.activate_multiball();
        state.apply_slow(Side::Two);
        state.ai.stuck_timer = 12;
        state.serving_side = Side::Two;

        state.reset_round();
        assert_eq!(state.balls.len(), 1);
        assert!(!state.multiball_active);
        // Slow outlives the point it was collected in
        assert_eq!(state.effect(Side::Two).kind, EffectKind::Slow);
        assert_eq!(state.player(Side::Two).speed_multiplier, SLOW_MULTIPLIER);
        assert_eq!(state.ai.stuck_timer, 0);
        assert_eq!(state.last_hitter, Some(Side::Two));
        assert_eq!(state.phase, MatchPhase::Serving { side: Side::Two });
    }

    #[test]
    fn test_serve_ball_launches_forward() {
        let mut state = MatchState::start_match(LevelKind::Beach, 21);
        assert!(state.serve_ball());
        assert_eq!(state.phase, MatchPhase::Rallying);
        assert!(state.primary_ball().vel.x > 0.0);
        assert!(!state.serve_ball());
    }

    #[test]
    fn test_shutdown_cancels_everything() {
        let mut state = rallying();
        state.spawn_power_up();
        state.apply_slow(Side::One);
        state.activate_multiball();

        state.shutdown();
        assert!(state.scheduler.is_empty());
        assert!(state.power_up.is_none());
        assert_eq!(state.balls.len(), 1);
        assert_eq!(state.player(Side::One).speed_multiplier, 1.0);
        assert_eq!(state.phase, MatchPhase::Stopped);
        assert!(!state.toggle_pause());
        state.shutdown();
    }

    proptest! {
        #[test]
        fn prop_strike_respects_speed_cap(
            vel_x in -3000.0f32..3000.0,
            vel_y in -3000.0f32..3000.0,
            offset in -50.0f32..50.0,
            run in -1000.0f32..1000.0,
            level in 0usize..3,
            ai_side in any::<bool>(),
        ) {
            let kind = [LevelKind::Beach, LevelKind::Lava, LevelKind::Hell][level];
            let mut state = MatchState::start_match(kind, 77);
            state.phase = MatchPhase::Rallying;
            let side = if ai_side { Side::Two } else { Side::One };
            let player = state.player_mut(side);
            player.vel.x = run;
            let (pos, half) = (player.pos, player.half);
            let ball = state.primary_ball_mut();
            ball.pos = Vec2::new(pos.x + offset, pos.y - half.y - 5.0);
            ball.vel = Vec2::new(vel_x, vel_y);
            let id = ball.id;

            prop_assert!(state.try_strike(id, side));
            prop_assert!(state.primary_ball().speed() <= state.profile.max_ball_speed + 0.01);
        }
    }
}
