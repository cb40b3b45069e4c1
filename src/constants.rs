/// Shared configuration for scene generation

/// Half-extent of one haze voxel cell in world units
pub const VOXEL_HALF_EXTENT: f32 = 0.5;

/// Shrink applied to each voxel mesh so adjacent volumes do not share faces
pub const VOXEL_MESH_MARGIN: f32 = 0.0001;

/// Camera ring radius as a multiple of the ground radius (√2)
pub const CAMERA_RING_SCALE: f32 = 1.414213;

/// Angular offset of the first camera on the ring (degrees)
pub const CAMERA_RING_START_DEG: f32 = 45.0;

/// Fraction of the camera height the rig looks at
pub const LOOK_AT_HEIGHT_SCALE: f32 = 0.5;

/// Fraction of the ground radius available for building placement
pub const BUILDING_REGION_SCALE: f64 = 0.7;

/// Attempt budget for rejection sampling before the round is abandoned
pub const DEFAULT_MAX_PLACEMENT_ATTEMPTS: usize = 10_000;

/// Seed offset between consecutive rounds, so each round is independently
/// reproducible from the base seed
pub const DEFAULT_SEED_STRIDE: u64 = 0x9e37_79b9_7f4a_7c15;

/// Scatter density range used when no input grid is supplied
pub const RANDOM_DENSITY_RANGE: (f64, f64) = (0.1, 0.3);

/// Ground plane diffuse colour
pub const GROUND_COLOR: [f32; 3] = [0.2, 0.2, 0.2];

/// Vertical offset of the ground plane below the voxel grid
pub const GROUND_Z_OFFSET: f32 = -0.001;

/// Sun lamp placement and emission strength
pub const SUN_POSITION: [f32; 3] = [10.0, 10.0, 10.0];
pub const SUN_STRENGTH: f32 = 5.0;

/// Render bounce limits carried to the backend
pub const MAX_BOUNCES: u32 = 12;
pub const TRANSPARENT_MAX_BOUNCES: u32 = 32;

/// Mist pass normalisation distance for depth renders
pub const MIST_DEPTH: f32 = 100.0;
