// Runtime parameters
pub const CANVAS_WIDTH: usize = 128;
pub const CANVAS_HEIGHT: usize = 128;
pub const OUT_FILE: &'static str = "./out.ppm";

// Scan offsets are scaled so that a 128 pixel wide image spans the screen.
pub const SCAN_WIDTH: f64 = 128.0;

// Distance from the viewpoint to the screen plane.
pub const SCREEN_DEPTH: f64 = 200.0;

// Floating point comparisons
pub const FEQ_EPSILON: f64 = 0.0001;

// Maximum recursion depth and the energy below which bounces stop
pub const MAX_BOUNCES: usize = 5;
pub const ENERGY_CUTOFF: f64 = 0.1;

// Objects with at least this diffuse coefficient receive sampled diffuse light
pub const DIFFUSE_SAMPLING_MIN: f64 = 0.5;

// Intersection search window
pub const SEARCH_LIMIT: f64 = 1.0e9;
pub const HIT_MIN: f64 = -0.1;
pub const HIT_MAX: f64 = 1.0e8;

// Offset past a boundary crossing used to test AND-group containment
pub const SURFACE_NUDGE: f64 = 0.01;

// Occluders must lie at least this far towards the light
pub const SHADOW_MIN_DISTANCE: f64 = -0.2;
pub const SHADOW_RANGE_DISTANCE: f64 = -0.1;

// Hemispherical sampling: groups, directions per group and energy divisor
pub const DIFFUSE_GROUPS: usize = 5;
pub const DIFFUSE_GROUP_SIZE: usize = 120;
pub const DIFFUSE_DIVISOR: f64 = 150.0;

// Texture colors are on a 0-255 scale; weights divide by this
pub const COLOR_SCALE: f64 = 256.0;

// Usual scene capacities. Exceeding them only warns.
pub const MAX_OBJECTS: usize = 60;
pub const MAX_AND_GROUPS: usize = 50;
pub const MAX_REFLECTIONS: usize = 180;

// Marks an OR-network entry without a range primitive in SLD streams
pub const NO_RANGE_PRIMITIVE: i64 = 99;
