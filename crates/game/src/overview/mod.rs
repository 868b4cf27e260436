//! Tactical map overview: the radar, the inset map, and the fullscreen map.
//!
//! One [`MapOverview`] owns the whole subsystem. Each frame the host
//! captures a [`GameSnapshot`](crate::state::GameSnapshot), feeds pending
//! [`GameEvent`](crate::events::GameEvent)s through [`MapOverview::handle_event`],
//! calls [`MapOverview::update`], and finally [`MapOverview::draw`] onto a
//! [`Surface`]. All drawing is panel-local; the host composites the panel
//! at [`MapOverview::panel_pos`].

pub mod clamp;
pub mod icons;
pub mod layout;
pub mod overlay;
pub mod projection;
pub mod visibility;

use engine_core::{GameClock, Team, Vec2, Vec3};
use renderer::{Color, Surface, TextureCatalog, TextureId, Vertex};

use crate::config::Prefs;
use crate::events::GameEvent;
use crate::mapinfo::MapInfo;
use crate::state::{GameSnapshot, PlayerSnapshot, UserId};

use clamp::{panel_inset, AngleBasis};
use icons::{IconParams, IconRenderer};
pub use layout::{DisplayMode, RadarPanel};
use layout::{BackgroundStyle, LayoutController};
use overlay::{OverlaySlot, RESPOT_GRACE, TIME_SPOTS_STAY_SEEN, TIME_UNTIL_ENEMY_SEEN};
use projection::{MapProjection, OVERVIEW_MAP_SIZE};
use visibility::{
    can_health_be_seen, can_name_be_seen, BaselinePolicy, OverviewPolicy, PolicyCtx, RadarPolicy,
};

/// Tracked-entity arena size. Matches the server's player cap.
pub const MAX_ROSTER: usize = 32;

/// Positions remembered per teammate for the trail display.
pub const TRAIL_LEN: usize = 16;

/// Height difference in world units before an entity reads as on a
/// different level than the viewer.
pub const DIFFERENCE_THRESHOLD: f32 = 100.0;

/// On-panel radius an icon aims for, in pixels.
const ICON_PIXEL_RADIUS: f32 = 8.0;

/// One roster slot. A slot is free until a player claims it and keeps the
/// identity until round end even if the player disconnects (their death
/// marker may still be fading).
#[derive(Debug, Clone)]
pub struct TrackedEntity {
    pub user_id: Option<UserId>,
    pub name: String,
    /// Last replicated world position. `Vec3::ZERO` means never placed.
    pub position: Vec3,
    pub yaw: f32,
    pub health: i32,
    pub team: Team,
    pub color: Color,
    pub icon: Option<TextureId>,
    /// Voice channel currently open, as of the last snapshot.
    pub speaking: bool,
    trail: [Vec3; TRAIL_LEN],
    trail_len: usize,
    trail_head: usize,
}

impl TrackedEntity {
    /// An unclaimed slot.
    pub fn empty() -> Self {
        Self {
            user_id: None,
            name: String::new(),
            position: Vec3::ZERO,
            yaw: 0.0,
            health: 0,
            team: Team::Spectator,
            color: Color::GREY,
            icon: None,
            speaking: false,
            trail: [Vec3::ZERO; TRAIL_LEN],
            trail_len: 0,
            trail_head: 0,
        }
    }

    pub fn in_use(&self) -> bool {
        self.user_id.is_some()
    }

    fn push_trail(&mut self, position: Vec3) {
        self.trail[self.trail_head] = position;
        self.trail_head = (self.trail_head + 1) % TRAIL_LEN;
        self.trail_len = (self.trail_len + 1).min(TRAIL_LEN);
    }

    /// Remembered positions, oldest first.
    fn trail(&self) -> impl Iterator<Item = Vec3> + '_ {
        let start = (self.trail_head + TRAIL_LEN - self.trail_len) % TRAIL_LEN;
        (0..self.trail_len).map(move |i| self.trail[(start + i) % TRAIL_LEN])
    }

    fn clear_trail(&mut self) {
        self.trail_len = 0;
        self.trail_head = 0;
    }
}

/// Resolved sprite handles for every icon the overview draws, per team.
/// Missing sprites resolve to `None` and those icons degrade to nothing.
#[derive(Debug, Clone, Default)]
pub struct IconSet {
    player: [Option<TextureId>; 2],
    player_offscreen: [Option<TextureId>; 2],
    dead: [Option<TextureId>; 2],
    dead_offscreen: [Option<TextureId>; 2],
    self_arrow: [Option<TextureId>; 2],
    facing_pip: Option<TextureId>,
    voice_ring: Option<TextureId>,
    voice_ring_offscreen: Option<TextureId>,
}

impl IconSet {
    /// Look up the standard sprite names in the catalog.
    pub fn load(catalog: &TextureCatalog) -> Self {
        let per_team = |base: &str| {
            [
                catalog.resolve(&format!("sprites/{}_crimson", base)),
                catalog.resolve(&format!("sprites/{}_cobalt", base)),
            ]
        };
        Self {
            player: per_team("player"),
            player_offscreen: per_team("player_offscreen"),
            dead: per_team("player_dead"),
            dead_offscreen: per_team("player_dead_offscreen"),
            self_arrow: per_team("player_self"),
            facing_pip: catalog.resolve("sprites/facing_pip"),
            voice_ring: catalog.resolve("sprites/voice_ring"),
            voice_ring_offscreen: catalog.resolve("sprites/voice_ring_offscreen"),
        }
    }

    /// Spectators index as Cobalt; they are never drawn anyway.
    fn team_index(team: Team) -> usize {
        match team {
            Team::Crimson => 0,
            Team::Cobalt | Team::Spectator => 1,
        }
    }

    fn player(&self, team: Team) -> Option<TextureId> {
        self.player[Self::team_index(team)]
    }

    fn player_offscreen(&self, team: Team) -> Option<TextureId> {
        self.player_offscreen[Self::team_index(team)]
    }

    fn dead(&self, team: Team) -> Option<TextureId> {
        self.dead[Self::team_index(team)]
    }

    fn dead_offscreen(&self, team: Team) -> Option<TextureId> {
        self.dead_offscreen[Self::team_index(team)]
    }

    fn self_arrow(&self, team: Team) -> Option<TextureId> {
        self.self_arrow[Self::team_index(team)]
    }

    fn team_color(team: Team) -> Color {
        match team {
            Team::Crimson => Color::RED,
            Team::Cobalt => Color::BLUE,
            Team::Spectator => Color::GREY,
        }
    }
}

/// A static per-map marker from the map info file.
#[derive(Debug, Clone)]
pub struct GoalIcon {
    pub position: Vec3,
    pub icon: Option<TextureId>,
}

/// The overview subsystem root.
pub struct MapOverview {
    projection: MapProjection,
    layout: LayoutController,
    prefs: Prefs,
    icons: IconSet,

    map_texture: Option<TextureId>,
    /// Pre-tinted radar variant of the map image, when the installation
    /// ships one. Absent for most maps.
    radar_texture: Option<TextureId>,
    /// Goal markers resolved at map load; the live list reloads from
    /// these after a round reset.
    goal_defs: Vec<GoalIcon>,
    goal_icons: Vec<GoalIcon>,
    goal_icons_loaded: bool,

    entities: [TrackedEntity; MAX_ROSTER],
    overlays: [OverlaySlot; MAX_ROSTER],

    local: Option<UserId>,
    /// Viewer pose sampled at update time, for the height heuristic and
    /// map rotation.
    viewer_position: Vec3,
    viewer_team: Team,
    viewer_alive: bool,

    radar_panel: RadarPanel,
    screen_size: Vec2,
    now: f32,
}

impl MapOverview {
    pub fn new(prefs: Prefs, icons: IconSet) -> Self {
        Self {
            projection: MapProjection::new(Vec2::new(-512.0, 512.0), 1.0),
            layout: LayoutController::default(),
            prefs,
            icons,
            map_texture: None,
            radar_texture: None,
            goal_defs: Vec::new(),
            goal_icons: Vec::new(),
            goal_icons_loaded: false,
            entities: std::array::from_fn(|_| TrackedEntity::empty()),
            overlays: std::array::from_fn(|_| OverlaySlot::default()),
            local: None,
            viewer_position: Vec3::ZERO,
            viewer_team: Team::Spectator,
            viewer_alive: false,
            radar_panel: RadarPanel::default(),
            screen_size: Vec2::new(1280.0, 720.0),
            now: 0.0,
        }
    }

    /// Install a map: projection placement, overview image, goal markers.
    /// Clears all per-round tracking state.
    pub fn set_map(&mut self, info: &MapInfo, catalog: &TextureCatalog) {
        self.projection = MapProjection::new(Vec2::from(info.origin), info.scale);
        self.map_texture = catalog.resolve(&info.texture);
        self.radar_texture = catalog.resolve_optional(&info.radar_texture_name());
        self.goal_defs = info
            .goals
            .iter()
            .map(|g| GoalIcon {
                position: Vec3::from(g.position),
                icon: catalog.resolve(&g.icon),
            })
            .collect();
        self.goal_icons = self.goal_defs.clone();
        self.goal_icons_loaded = true;
        self.entities = std::array::from_fn(|_| TrackedEntity::empty());
        self.overlays = std::array::from_fn(|_| OverlaySlot::default());
    }

    pub fn set_screen_size(&mut self, size: Vec2) {
        self.screen_size = size;
    }

    pub fn set_radar_panel(&mut self, panel: RadarPanel) {
        self.radar_panel = panel;
    }

    pub fn prefs(&self) -> &Prefs {
        &self.prefs
    }

    pub fn mode(&self) -> DisplayMode {
        self.layout.mode()
    }

    pub fn panel_pos(&self) -> Vec2 {
        self.layout.panel_pos()
    }

    pub fn panel_size(&self) -> Vec2 {
        self.layout.panel_size()
    }

    /// Explicit mode request from the player. Recorded as the preference;
    /// the radar still takes over while they are alive.
    pub fn request_mode(&mut self, mode: DisplayMode) {
        self.prefs.set_preferred_mode(mode);
    }

    /// Per-frame update: mode arbitration, layout glide, projection pose,
    /// then the roster passes.
    pub fn update(&mut self, clock: &GameClock, snapshot: &GameSnapshot) {
        self.now = clock.now();
        let dt = clock.delta_seconds();

        if !self.goal_icons_loaded {
            self.goal_icons = self.goal_defs.clone();
            self.goal_icons_loaded = true;
        }

        self.local = snapshot.local;
        let local = snapshot.local_player();
        self.viewer_alive = local.map(|p| p.alive).unwrap_or(false);
        self.viewer_team = local.map(|p| p.team).unwrap_or(Team::Spectator);
        if let Some(p) = local {
            self.viewer_position = p.position;
        }

        // A live player gets the radar whether they like it or not.
        let mode = if self.viewer_alive {
            DisplayMode::Radar
        } else {
            self.prefs.preferred_mode
        };
        self.layout.set_mode(
            mode,
            &self.prefs,
            self.projection.map_scale(),
            self.projection.full_zoom(),
        );
        self.layout.update(dt, self.screen_size, &self.radar_panel);

        self.projection.set_zoom(self.layout.zoom());
        let border = self.layout.border_size();
        self.projection
            .set_panel_size(self.layout.panel_size() - Vec2::splat(border * 2.0));

        if let Some(p) = local {
            if self.layout.mode() == DisplayMode::Radar && !self.prefs.radar_locked {
                self.projection.set_view_angle(p.yaw);
            } else {
                self.projection.set_view_angle(90.0);
            }
            self.projection.follow_world_position(p.position);
        }

        self.update_players(snapshot, dt);
    }

    fn update_players(&mut self, snapshot: &GameSnapshot, dt: f32) {
        for overlay in self.overlays.iter_mut() {
            overlay.update_flash(self.now, dt);
        }

        for player in &snapshot.players {
            // A disconnected player stops replicating but keeps their slot;
            // their death marker may still be fading.
            if !player.connected {
                continue;
            }
            let Some(idx) = self.slot_for(player.user_id, true) else {
                log::warn!("Roster full, dropping player {:?}", player.user_id);
                continue;
            };
            self.refresh_slot(idx, player);
        }

        // Spot pass: currently detected live enemies earn or keep their
        // seen timestamps, and a re-spot removes a stale ghost marker.
        for player in &snapshot.players {
            if self.viewer_team.is_ally(player.team) {
                continue;
            }
            let Some(idx) = self.slot_for(player.user_id, false) else {
                continue;
            };
            if player.spotted && player.alive {
                self.overlays[idx].mark_seen(self.now);
                if self.overlays[idx].override_active(self.now) && !self.overlays[idx].is_dead {
                    self.overlays[idx].clear_override();
                    self.overlays[idx].mark_seen(self.now);
                }
            }
        }

        // Ghost pass, radar only: an enemy that earned its dwell and just
        // dropped out of detection leaves a one-shot last-known marker.
        // The pass consumes the streak either way, so the same fade-out
        // never ghosts twice and a short streak never lingers.
        if self.layout.mode() != DisplayMode::Radar {
            return;
        }
        for idx in 0..MAX_ROSTER {
            let entity = &self.entities[idx];
            if !entity.in_use()
                || entity.health <= 0
                || self.viewer_team.is_ally(entity.team)
                || self.overlays[idx].override_active(self.now)
            {
                continue;
            }
            let (Some(last), Some(first)) =
                (self.overlays[idx].last_seen_at, self.overlays[idx].first_seen_at)
            else {
                continue;
            };
            let unseen_for = self.now - last;
            if unseen_for > RESPOT_GRACE && unseen_for < TIME_SPOTS_STAY_SEEN {
                if self.now - first > TIME_UNTIL_ENEMY_SEEN {
                    let icon = entity.icon;
                    let offscreen = self.icons.player_offscreen(entity.team);
                    let pos = entity.position;
                    let yaw = entity.yaw;
                    self.overlays[idx].set_last_known_marker(self.now, icon, offscreen, pos, yaw);
                }
                // The streak ends here whether or not it earned a marker,
                // so the next sighting starts the dwell from scratch.
                self.overlays[idx].last_seen_at = None;
                self.overlays[idx].first_seen_at = None;
            }
        }
    }

    /// Find the slot for `id`, optionally claiming a free one.
    fn slot_for(&mut self, id: UserId, allocate: bool) -> Option<usize> {
        if let Some(idx) = self
            .entities
            .iter()
            .position(|e| e.user_id == Some(id))
        {
            return Some(idx);
        }
        if !allocate {
            return None;
        }
        let idx = self.entities.iter().position(|e| !e.in_use())?;
        let entity = &mut self.entities[idx];
        entity.user_id = Some(id);
        self.overlays[idx].clear();
        Some(idx)
    }

    fn refresh_slot(&mut self, idx: usize, player: &PlayerSnapshot) {
        let entity = &mut self.entities[idx];

        if entity.team != player.team {
            // Team swaps change the livery but leave any active marker
            // alone: a death marker belongs to the round it happened in.
            entity.team = player.team;
            entity.icon = self.icons.player(player.team);
            entity.color = IconSet::team_color(player.team);
        }
        if entity.icon.is_none() {
            entity.icon = self.icons.player(player.team);
            entity.color = IconSet::team_color(player.team);
        }
        entity.name = player.name.clone();
        entity.health = player.health;
        entity.speaking = player.speaking;

        // Event delivery is unordered relative to replication; if the
        // snapshot says dead, the slot is dead no matter what arrived.
        if !player.alive {
            entity.health = 0;
            self.overlays[idx].is_dead = true;
        } else {
            self.overlays[idx].is_dead = false;
        }

        if !player.dormant {
            if player.alive && entity.position != player.position {
                entity.push_trail(player.position);
            }
            entity.position = player.position;
            entity.yaw = player.yaw;
        }
    }

    /// Dispatch one game event. Unknown identities are ignored.
    pub fn handle_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::PlayerDeath { user_id } => {
                let Some(idx) = self.slot_for(*user_id, false) else {
                    return;
                };
                let entity = &mut self.entities[idx];
                entity.health = 0;
                entity.clear_trail();
                let icon = self.icons.dead(entity.team);
                let offscreen = self.icons.dead_offscreen(entity.team);
                let pos = entity.position;
                let yaw = entity.yaw;
                self.overlays[idx].set_death_marker(self.now, icon, pos, yaw);
                self.overlays[idx].override_icon_offscreen = offscreen;
            }
            GameEvent::PlayerTeam { user_id, team } => {
                let Some(idx) = self.slot_for(*user_id, true) else {
                    return;
                };
                let entity = &mut self.entities[idx];
                entity.team = *team;
                entity.icon = self.icons.player(*team);
                entity.color = IconSet::team_color(*team);
            }
            GameEvent::PlayerSpotted { user_id } => {
                let Some(idx) = self.slot_for(*user_id, false) else {
                    return;
                };
                self.overlays[idx].mark_seen(self.now);
                if self.overlays[idx].override_active(self.now)
                    && !self.overlays[idx].is_dead
                    && self.entities[idx].health > 0
                {
                    self.overlays[idx].clear_override();
                    self.overlays[idx].mark_seen(self.now);
                }
            }
            GameEvent::VoiceFlash { user_id } => {
                let Some(idx) = self.slot_for(*user_id, false) else {
                    return;
                };
                self.overlays[idx].start_flash(self.now);
            }
            GameEvent::RoundReset => self.round_reset(),
        }
    }

    /// New round: every marker, flash, seen timestamp, trail, and goal
    /// marker goes. Identities and the map stay; goals repopulate from
    /// the next [`set_map`](Self::set_map).
    pub fn round_reset(&mut self) {
        for overlay in self.overlays.iter_mut() {
            overlay.clear();
        }
        for entity in self.entities.iter_mut() {
            entity.clear_trail();
        }
        self.goal_icons.clear();
        self.goal_icons_loaded = false;
    }

    /// Whether the panel should be drawn at all this frame.
    pub fn should_draw(&self) -> bool {
        if self.layout.master_alpha(&self.prefs) <= 0.0 {
            return false;
        }
        match self.layout.mode() {
            DisplayMode::Off => false,
            DisplayMode::Radar => self.radar_panel.visible && self.viewer_alive,
            DisplayMode::Inset | DisplayMode::Full => true,
        }
    }

    fn angle_basis(&self) -> AngleBasis {
        if self.layout.mode() == DisplayMode::Radar && !self.prefs.radar_locked {
            AngleBasis::FollowView(self.projection.view_angle())
        } else if self.projection.view_angle() == 90.0 {
            AngleBasis::NorthUp
        } else {
            AngleBasis::Rotated
        }
    }

    /// World half-extent that projects to [`ICON_PIXEL_RADIUS`] pixels.
    fn icon_world_size(&self) -> f32 {
        let pixels_per_unit = self.projection.pixel_offset(1.0);
        if pixels_per_unit > 0.0 {
            ICON_PIXEL_RADIUS / pixels_per_unit
        } else {
            ICON_PIXEL_RADIUS
        }
    }

    /// Draw the whole panel in panel-local coordinates: background, map
    /// image, trails, goal markers, players.
    pub fn draw(&self, surface: &mut dyn Surface) {
        let master = self.layout.master_alpha(&self.prefs);
        if master <= 0.0 {
            return;
        }
        let panel_size = self.projection.panel_size();
        let inset = panel_inset(self.layout.border_size());

        if self.layout.background() == BackgroundStyle::RoundedCorners {
            surface.draw_filled_rect(
                Vec2::ZERO,
                panel_size,
                Color::BLACK.with_alpha((master * 0.5) as u8),
            );
        }

        self.draw_map_texture(surface, master, panel_size);

        let renderer = IconRenderer {
            projection: &self.projection,
            inset,
            angle_basis: self.angle_basis(),
        };

        if self.prefs.show_trails {
            self.draw_trails(surface, master, panel_size);
        }

        let icon_size = self.icon_world_size();
        for goal in &self.goal_icons {
            let mut params = IconParams::plain(
                goal.icon,
                None,
                goal.position,
                icon_size * 2.0,
                0.0,
                master,
            );
            params.allow_rotation = false;
            renderer.draw_icon(surface, &params);
        }

        self.draw_players(surface, &renderer, master, icon_size);
    }

    /// Map image under everything else. The radar prefers the pre-tinted
    /// variant and falls back to tinting the base image green.
    fn draw_map_texture(&self, surface: &mut dyn Surface, master: f32, panel_size: Vec2) {
        let in_radar = self.layout.mode() == DisplayMode::Radar;
        let (texture, color) = if in_radar {
            match self.radar_texture {
                Some(t) => (Some(t), Color::WHITE.with_alpha(master as u8)),
                None => (
                    self.map_texture,
                    Color::rgba(0, 255, 0, (master * 0.25) as u8),
                ),
            }
        } else {
            (self.map_texture, Color::WHITE.with_alpha(master as u8))
        };
        let Some(texture) = texture else {
            return;
        };

        // The quad is the panel itself; each corner samples wherever the
        // inverse projection says that corner currently sits on the map.
        let corners = [
            Vec2::ZERO,
            Vec2::new(panel_size.x, 0.0),
            panel_size,
            Vec2::new(0.0, panel_size.y),
        ];
        let mut points = [Vertex::new(Vec2::ZERO, Vec2::ZERO); 4];
        for (i, corner) in corners.iter().enumerate() {
            let map = self.projection.panel_to_map(*corner);
            points[i] = Vertex::new(*corner, map / OVERVIEW_MAP_SIZE);
        }
        surface.draw_textured_polygon(texture, &points, color);
    }

    /// Teammate breadcrumbs, brightening toward the newest position.
    fn draw_trails(&self, surface: &mut dyn Surface, master: f32, panel_size: Vec2) {
        for entity in &self.entities {
            if !entity.in_use() || !self.viewer_team.is_ally(entity.team) {
                continue;
            }
            let len = entity.trail_len.max(1) as f32;
            for (i, pos) in entity.trail().enumerate() {
                let p = self.projection.world_to_panel(pos);
                if p.x < 0.0 || p.y < 0.0 || p.x > panel_size.x || p.y > panel_size.y {
                    continue;
                }
                let alpha = master * (i as f32 + 1.0) / len * 0.5;
                surface.draw_filled_rect(
                    p - Vec2::ONE,
                    p + Vec2::ONE,
                    entity.color.with_alpha(alpha as u8),
                );
            }
        }
    }

    fn draw_players(
        &self,
        surface: &mut dyn Surface,
        renderer: &IconRenderer,
        master: f32,
        icon_size: f32,
    ) {
        let ctx = PolicyCtx {
            now: self.now,
            viewer_team: self.viewer_team,
        };
        let radar_rules = self.layout.mode() == DisplayMode::Radar;

        for (entity, overlay) in self.entities.iter().zip(self.overlays.iter()) {
            if !entity.in_use() {
                continue;
            }
            let visible = if radar_rules {
                RadarPolicy.can_be_seen(&ctx, entity, overlay)
            } else {
                BaselinePolicy.can_be_seen(&ctx, entity, overlay)
            };
            if !visible {
                continue;
            }

            if overlay.override_active(self.now) {
                self.draw_marker(surface, renderer, entity, overlay, master, icon_size);
                continue;
            }

            self.draw_live_player(surface, renderer, &ctx, entity, overlay, master, icon_size);
        }
    }

    /// A death marker or last-known ghost, frozen at the recorded pose.
    fn draw_marker(
        &self,
        surface: &mut dyn Surface,
        renderer: &IconRenderer,
        entity: &TrackedEntity,
        overlay: &OverlaySlot,
        master: f32,
        icon_size: f32,
    ) {
        let mut alpha = overlay.override_alpha(self.now, master);
        if entity.health > 0 {
            // Ghosts read as uncertain, not as live contacts.
            alpha *= 0.5;
        }
        // The marker quad tracks the view angle so it stays panel-upright
        // while the radar rotates; the pip keeps the recorded facing.
        let params = IconParams::plain(
            overlay.override_icon,
            overlay.override_icon_offscreen,
            overlay.override_position,
            icon_size * 1.1,
            self.projection.view_angle(),
            alpha,
        );
        let drawn = renderer.draw_icon(surface, &params);
        if drawn && entity.health > 0 {
            let pip = IconParams::plain(
                self.icons.facing_pip,
                None,
                overlay.override_position,
                icon_size * 0.5,
                overlay.override_yaw,
                alpha,
            );
            renderer.draw_icon(surface, &pip);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_live_player(
        &self,
        surface: &mut dyn Surface,
        renderer: &IconRenderer,
        ctx: &PolicyCtx,
        entity: &TrackedEntity,
        overlay: &OverlaySlot,
        master: f32,
        icon_size: f32,
    ) {
        let is_self = entity.user_id == self.local;

        // Relative height picks the ring and dot sizes: bigger and fainter
        // above the viewer, smaller below, in between when level.
        let dz = entity.position.z - self.viewer_position.z;
        let (ring_scale, dot_scale, dot_alpha) = if dz > DIFFERENCE_THRESHOLD {
            (1.9, 1.6, master * 0.5)
        } else if dz < -DIFFERENCE_THRESHOLD {
            (1.0, 0.7, master)
        } else {
            (1.4, 1.1, master)
        };

        // Voice ring under the dot, teammates only (spectators hear
        // everyone). The flash envelope wins over the steady speaking ring.
        let show_talk_ring = self.viewer_team.is_ally(entity.team)
            || self.viewer_team == Team::Spectator;
        let ring_alpha = if !show_talk_ring {
            0.0
        } else if overlay.current_flash_alpha > 0.0 {
            overlay.current_flash_alpha.min(master)
        } else if entity.speaking {
            master
        } else {
            0.0
        };
        if ring_alpha > 0.0 {
            let ring = IconParams::plain(
                self.icons.voice_ring,
                self.icons.voice_ring_offscreen,
                entity.position,
                icon_size * ring_scale,
                0.0,
                ring_alpha,
            );
            renderer.draw_icon(surface, &ring);
        }

        let (texture, scale) = if is_self {
            (self.icons.self_arrow(entity.team), icon_size * 4.0)
        } else {
            (entity.icon, icon_size * dot_scale)
        };
        let mut params = IconParams::plain(
            texture,
            self.icons.player_offscreen(entity.team),
            entity.position,
            scale,
            entity.yaw,
            dot_alpha,
        );
        // Only the self arrow spins with its facing; other dots follow the
        // view angle so they stay panel-upright in follow mode and show
        // their heading with the pip instead.
        if !is_self {
            params.yaw = self.projection.view_angle();
        }
        if self.prefs.show_names && can_name_be_seen(ctx, entity) && !is_self {
            params.name = Some(&entity.name);
            params.name_color = entity.color;
        }
        if self.prefs.show_health && can_health_be_seen(ctx, entity) {
            params.status = Some((entity.health.max(0) as f32 / 100.0).min(1.0));
            params.status_color = Color::GREEN;
        }
        let drawn = renderer.draw_icon(surface, &params);

        if drawn && !is_self {
            let pip = IconParams::plain(
                self.icons.facing_pip,
                None,
                entity.position,
                icon_size * 0.5,
                entity.yaw,
                dot_alpha,
            );
            renderer.draw_icon(surface, &pip);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderer::DrawList;

    fn catalog() -> TextureCatalog {
        let mut c = TextureCatalog::new();
        for team in ["crimson", "cobalt"] {
            c.register(&format!("sprites/player_{team}"));
            c.register(&format!("sprites/player_offscreen_{team}"));
            c.register(&format!("sprites/player_dead_{team}"));
            c.register(&format!("sprites/player_dead_offscreen_{team}"));
            c.register(&format!("sprites/player_self_{team}"));
        }
        c.register("sprites/facing_pip");
        c.register("sprites/voice_ring");
        c.register("sprites/voice_ring_offscreen");
        c.register("overviews/outpost");
        c.register("sprites/goal_flag");
        c
    }

    fn map_info() -> MapInfo {
        MapInfo::from_ron(
            r#"(
                name: "outpost",
                texture: "overviews/outpost",
                origin: (-2048.0, 2048.0),
                scale: 4.0,
                goals: [(icon: "sprites/goal_flag", position: (512.0, -256.0, 0.0))],
            )"#,
        )
        .unwrap()
    }

    fn overview() -> MapOverview {
        let catalog = catalog();
        let mut ov = MapOverview::new(Prefs::default(), IconSet::load(&catalog));
        ov.set_map(&map_info(), &catalog);
        ov
    }

    fn player(id: u32, team: Team, pos: Vec3) -> PlayerSnapshot {
        PlayerSnapshot {
            user_id: UserId(id),
            name: format!("player{id}"),
            connected: true,
            alive: true,
            health: 100,
            team,
            spotted: false,
            speaking: false,
            dormant: false,
            position: pos,
            yaw: 0.0,
        }
    }

    fn snapshot(players: Vec<PlayerSnapshot>) -> GameSnapshot {
        GameSnapshot {
            local: Some(UserId(1)),
            players,
        }
    }

    #[test]
    fn live_local_player_forces_radar() {
        let mut ov = overview();
        let mut clock = GameClock::new();
        clock.tick(0.016);
        let snap = snapshot(vec![player(1, Team::Crimson, Vec3::new(10.0, 10.0, 0.0))]);
        ov.update(&clock, &snap);
        assert_eq!(ov.mode(), DisplayMode::Radar);

        let mut dead = snap;
        dead.players[0].alive = false;
        dead.players[0].health = 0;
        clock.tick(0.016);
        ov.update(&clock, &dead);
        assert_eq!(ov.mode(), DisplayMode::Inset);
    }

    #[test]
    fn enemy_dwell_then_fade_spawns_one_ghost() {
        let mut ov = overview();
        let mut clock = GameClock::new();
        let mut enemy = player(2, Team::Cobalt, Vec3::new(100.0, 100.0, 0.0));
        enemy.spotted = true;
        let me = player(1, Team::Crimson, Vec3::new(10.0, 10.0, 0.0));

        // Spotted continuously for 0.7 seconds: dwell satisfied.
        for _ in 0..7 {
            clock.tick(0.1);
            ov.update(&clock, &snapshot(vec![me.clone(), enemy.clone()]));
        }
        let idx = ov.slot_for(UserId(2), false).unwrap();
        assert!(ov.overlays[idx].last_seen_at.is_some());
        assert!(!ov.overlays[idx].override_active(clock.now()));

        // Detection drops. After the grace period a ghost appears, and
        // installing it ends the streak.
        enemy.spotted = false;
        for _ in 0..4 {
            clock.tick(0.1);
            ov.update(&clock, &snapshot(vec![me.clone(), enemy.clone()]));
        }
        assert!(ov.overlays[idx].override_active(clock.now()));
        assert!(ov.overlays[idx].last_seen_at.is_none());
        assert!(ov.overlays[idx].first_seen_at.is_none());

        // The marker outlives its four seconds and no second ghost forms.
        for _ in 0..45 {
            clock.tick(0.1);
            ov.update(&clock, &snapshot(vec![me.clone(), enemy.clone()]));
        }
        assert!(!ov.overlays[idx].override_active(clock.now()));
    }

    #[test]
    fn ghost_dwell_counts_from_first_sighting() {
        let mut ov = overview();
        let mut clock = GameClock::new();
        let mut enemy = player(2, Team::Cobalt, Vec3::new(100.0, 100.0, 0.0));
        enemy.spotted = true;
        let me = player(1, Team::Crimson, Vec3::new(10.0, 10.0, 0.0));

        // Spotted from t = 0.1 to t = 0.4, then the contact drops.
        for _ in 0..4 {
            clock.tick(0.1);
            ov.update(&clock, &snapshot(vec![me.clone(), enemy.clone()]));
        }
        enemy.spotted = false;

        // At t = 0.7 the enemy has been tracked for 0.6 seconds total and
        // unseen for 0.3. The dwell clock runs from the first sighting to
        // now, not just across the spotted frames, so a ghost appears.
        clock.tick(0.3);
        ov.update(&clock, &snapshot(vec![me.clone(), enemy.clone()]));
        let idx = ov.slot_for(UserId(2), false).unwrap();
        assert!(ov.overlays[idx].override_active(clock.now()));
        assert!(ov.overlays[idx].first_seen_at.is_none());
    }

    #[test]
    fn short_streak_is_consumed_without_a_ghost() {
        let mut ov = overview();
        let mut clock = GameClock::new();
        let mut enemy = player(2, Team::Cobalt, Vec3::new(100.0, 100.0, 0.0));
        enemy.spotted = true;
        let me = player(1, Team::Crimson, Vec3::new(10.0, 10.0, 0.0));

        // Two spotted frames, then the contact drops right away.
        for _ in 0..2 {
            clock.tick(0.1);
            ov.update(&clock, &snapshot(vec![me.clone(), enemy.clone()]));
        }
        enemy.spotted = false;
        for _ in 0..4 {
            clock.tick(0.1);
            ov.update(&clock, &snapshot(vec![me.clone(), enemy.clone()]));
        }

        // No ghost earned, and the unfinished streak is gone with it.
        let idx = ov.slot_for(UserId(2), false).unwrap();
        assert!(!ov.overlays[idx].override_active(clock.now()));
        assert!(ov.overlays[idx].last_seen_at.is_none());
        assert!(ov.overlays[idx].first_seen_at.is_none());

        // A single sighting much later starts a fresh dwell instead of
        // reviving the stale streak.
        clock.tick(4.0);
        enemy.spotted = true;
        ov.update(&clock, &snapshot(vec![me.clone(), enemy.clone()]));
        assert_eq!(ov.overlays[idx].first_seen_at, Some(clock.now()));
        let ctx = PolicyCtx {
            now: clock.now(),
            viewer_team: Team::Crimson,
        };
        assert!(!RadarPolicy.can_be_seen(&ctx, &ov.entities[idx], &ov.overlays[idx]));
    }

    #[test]
    fn death_event_installs_marker_and_team_swap_keeps_it() {
        let mut ov = overview();
        let mut clock = GameClock::new();
        clock.tick(1.0);
        let snap = snapshot(vec![
            player(1, Team::Crimson, Vec3::new(10.0, 10.0, 0.0)),
            player(2, Team::Cobalt, Vec3::new(50.0, 50.0, 0.0)),
        ]);
        ov.update(&clock, &snap);

        ov.handle_event(&GameEvent::PlayerDeath { user_id: UserId(2) });
        let idx = ov.slot_for(UserId(2), false).unwrap();
        assert!(ov.overlays[idx].override_active(clock.now()));
        assert_eq!(ov.entities[idx].health, 0);

        ov.handle_event(&GameEvent::PlayerTeam {
            user_id: UserId(2),
            team: Team::Crimson,
        });
        // Livery changed, marker untouched.
        assert_eq!(ov.entities[idx].team, Team::Crimson);
        assert!(ov.overlays[idx].override_active(clock.now()));
    }

    #[test]
    fn round_reset_clears_markers_but_keeps_identities() {
        let mut ov = overview();
        let mut clock = GameClock::new();
        clock.tick(1.0);
        let snap = snapshot(vec![player(2, Team::Cobalt, Vec3::new(50.0, 50.0, 0.0))]);
        ov.update(&clock, &snap);
        ov.handle_event(&GameEvent::PlayerDeath { user_id: UserId(2) });

        ov.handle_event(&GameEvent::RoundReset);
        let idx = ov.slot_for(UserId(2), false).unwrap();
        assert!(!ov.overlays[idx].override_active(clock.now()));
        assert!(ov.entities[idx].in_use());
        assert!(ov.goal_icons.is_empty());
    }

    #[test]
    fn unknown_identity_events_are_ignored() {
        let mut ov = overview();
        ov.handle_event(&GameEvent::PlayerDeath { user_id: UserId(99) });
        ov.handle_event(&GameEvent::VoiceFlash { user_id: UserId(99) });
        assert!(ov.overlays.iter().all(|o| !o.override_active(0.0)));
    }

    #[test]
    fn should_draw_gates_radar_on_panel_and_life() {
        let mut ov = overview();
        let mut clock = GameClock::new();
        clock.tick(0.016);
        let snap = snapshot(vec![player(1, Team::Crimson, Vec3::new(10.0, 10.0, 0.0))]);
        ov.update(&clock, &snap);
        assert!(ov.should_draw());

        ov.set_radar_panel(RadarPanel {
            visible: false,
            ..RadarPanel::default()
        });
        assert!(!ov.should_draw());
    }

    #[test]
    fn draw_emits_map_quad_first() {
        let mut ov = overview();
        let mut clock = GameClock::new();
        clock.tick(0.016);
        let snap = snapshot(vec![player(1, Team::Crimson, Vec3::new(10.0, 10.0, 0.0))]);
        ov.update(&clock, &snap);

        let mut list = DrawList::new();
        ov.draw(&mut list);
        assert!(!list.is_empty());
        // Radar background rect, then the map quad (green-tinted: this
        // catalog has no pre-rendered radar image).
        let quad = list
            .commands()
            .iter()
            .find_map(|c| match c {
                renderer::DrawCmd::TexturedPolygon { color, .. } => Some(*color),
                _ => None,
            })
            .unwrap();
        assert_eq!((quad.r, quad.g, quad.b), (0, 255, 0));
    }

    #[test]
    fn voice_ring_stays_off_enemy_dots() {
        let mut ov = overview();
        let mut clock = GameClock::new();
        let me = player(1, Team::Crimson, Vec3::new(10.0, 10.0, 0.0));
        let mut ally = player(3, Team::Crimson, Vec3::new(40.0, 40.0, 0.0));
        let mut enemy = player(2, Team::Cobalt, Vec3::new(100.0, 100.0, 0.0));
        enemy.spotted = true;

        // The enemy earns its dwell so its dot is on the radar at all.
        for _ in 0..7 {
            clock.tick(0.1);
            ov.update(&clock, &snapshot(vec![me.clone(), ally.clone(), enemy.clone()]));
        }
        let mut quiet = DrawList::new();
        ov.draw(&mut quiet);

        // A talking enemy draws exactly what a silent one does.
        enemy.speaking = true;
        clock.tick(0.1);
        ov.update(&clock, &snapshot(vec![me.clone(), ally.clone(), enemy.clone()]));
        let mut enemy_talking = DrawList::new();
        ov.draw(&mut enemy_talking);
        assert_eq!(enemy_talking.len(), quiet.len());

        // A talking teammate gets the ring under their dot.
        enemy.speaking = false;
        ally.speaking = true;
        clock.tick(0.1);
        ov.update(&clock, &snapshot(vec![me.clone(), ally.clone(), enemy.clone()]));
        let mut ally_talking = DrawList::new();
        ov.draw(&mut ally_talking);
        assert_eq!(ally_talking.len(), quiet.len() + 1);
    }

    #[test]
    fn dots_and_markers_stay_upright_while_the_radar_rotates() {
        let mut ov = overview();
        let mut clock = GameClock::new();
        let mut me = player(1, Team::Crimson, Vec3::new(10.0, 10.0, 0.0));
        me.yaw = 37.0;
        let mut enemy = player(2, Team::Cobalt, Vec3::new(100.0, 100.0, 0.0));
        enemy.spotted = true;
        enemy.yaw = 200.0;

        // Unlocked radar follows the viewer's facing, so the whole map is
        // rotated by 37 degrees while the enemy dwell completes.
        for _ in 0..7 {
            clock.tick(0.1);
            ov.update(&clock, &snapshot(vec![me.clone(), enemy.clone()]));
        }

        fn upright(points: &[Vertex; 4]) -> bool {
            (points[0].position.y - points[1].position.y).abs() < 1e-3
        }

        let mut list = DrawList::new();
        ov.draw(&mut list);
        // Tail of the list: self arrow, health bar pair, enemy dot, pip.
        let cmds = list.commands();
        match &cmds[cmds.len() - 2] {
            renderer::DrawCmd::TexturedPolygon { points, .. } => {
                assert!(upright(points), "enemy dot counter-rotated: {points:?}");
            }
            other => panic!("expected the enemy dot, got {other:?}"),
        }
        // The pip is the one quad that keeps the entity's own facing.
        match &cmds[cmds.len() - 1] {
            renderer::DrawCmd::TexturedPolygon { points, .. } => assert!(!upright(points)),
            other => panic!("expected the facing pip, got {other:?}"),
        }

        // A death marker freezes the pose but still tracks the view angle.
        ov.handle_event(&GameEvent::PlayerDeath { user_id: UserId(2) });
        let mut after = DrawList::new();
        ov.draw(&mut after);
        let cmds = after.commands();
        match &cmds[cmds.len() - 1] {
            renderer::DrawCmd::TexturedPolygon { points, .. } => {
                assert!(upright(points), "marker counter-rotated: {points:?}");
            }
            other => panic!("expected the death marker, got {other:?}"),
        }
    }
}
