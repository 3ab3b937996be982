//! Dropfield demo host
//!
//! Native: headless run that spawns from a catalog and tessellates every frame.
//! Web: canvas host presenting through WebGPU.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Demo catalog used when no catalog file is given
#[cfg(not(target_arch = "wasm32"))]
const DEMO_CATALOG: &str = r#"[
    {"name": "Copper Coin", "weight": 60, "value": 1, "category": "common"},
    {"name": "Silver Ring", "weight": 25, "value": 40, "category": "rare"},
    {"name": "Amethyst", "weight": 10, "value": 850, "category": "epic"},
    {"name": "Dragon Crown", "weight": 1, "value": 25000, "category": "legendary"}
]"#;

/// Demo beams: epic and legendary items glow
fn demo_beams() -> dropfield::sim::BeamTable {
    use dropfield::sim::{BeamConfig, BeamTable, Category};

    let mut table = BeamTable::default();
    table.set(Category::Epic, BeamConfig::colored("#a24dff"));
    table.set(Category::Legendary, BeamConfig::colored("#ffc21a"));
    table
}

#[cfg(target_arch = "wasm32")]
mod wasm_host {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent};

    use dropfield::consts::REFERENCE_FRAME_MS;
    use dropfield::renderer::{BatchPresenter, VertexBatch};
    use dropfield::sim::{BeamTable, Category, Item, SceneController, WeightedPool};
    use dropfield::{DropError, SceneSettings};

    /// Milliseconds between automatic drops
    const AUTO_SPAWN_MS: f32 = 600.0;

    /// Host instance holding all state
    struct Host {
        scene: SceneController,
        batch: VertexBatch,
        presenter: Option<BatchPresenter>,
        pool: WeightedPool,
        beams: BeamTable,
        last_time: f64,
        spawn_timer: f32,
    }

    impl Host {
        fn new(canvas: Vec2, seed: u64) -> Self {
            let pool = WeightedPool::load(vec![
                Item::new("Copper Coin", 60.0, 1.0, Category::Common),
                Item::new("Silver Ring", 25.0, 40.0, Category::Rare),
                Item::new("Amethyst", 10.0, 850.0, Category::Epic),
                Item::new("Dragon Crown", 1.0, 25_000.0, Category::Legendary),
            ])
            .unwrap_or_default();
            Self {
                scene: SceneController::new(canvas, SceneSettings::default(), seed),
                batch: VertexBatch::new(canvas),
                presenter: None,
                pool,
                beams: super::demo_beams(),
                last_time: 0.0,
                spawn_timer: 0.0,
            }
        }

        fn spawn(&mut self) {
            match self.scene.spawn_from_pool(&self.pool, &self.beams) {
                Ok(_) => {}
                Err(DropError::NoValidPosition { .. }) => log::debug!("Region is full, skipping drop"),
                Err(e) => log::warn!("Spawn failed: {}", e),
            }
        }

        fn update(&mut self, dt_ms: f32) {
            self.spawn_timer += dt_ms;
            if self.spawn_timer >= AUTO_SPAWN_MS {
                self.spawn_timer = 0.0;
                self.spawn();
            }
            self.scene.update(dt_ms);
        }

        fn render(&mut self) {
            self.scene.render(&mut self.batch);
            if let Some(ref mut presenter) = self.presenter {
                match presenter.present(&self.batch) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        presenter.resize(presenter.size.0, presenter.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Dropfield starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No <canvas id=\"canvas\"> element");
            return;
        };

        // Scene works in CSS pixels, the backing store in device pixels
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let host = Rc::new(RefCell::new(Host::new(
            Vec2::new(client_w as f32, client_h as f32),
            seed,
        )));
        log::info!("Scene initialized with seed: {}", seed);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                return;
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {}", e);
                return;
            }
        };

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match BatchPresenter::new(surface, &adapter, width, height).await {
            Ok(presenter) => host.borrow_mut().presenter = Some(presenter),
            Err(e) => log::error!("{}", e),
        }

        setup_input_handlers(&canvas, host.clone());
        request_animation_frame(host);

        log::info!("Dropfield running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, host: Rc<RefCell<Host>>) {
        // Hover labels
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut h = host.borrow_mut();
                h.scene
                    .set_hovered_at(event.offset_x() as f32, event.offset_y() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Click drops an item
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                host.borrow_mut().spawn();
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(host: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            frame_loop(host, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(host: Rc<RefCell<Host>>, time: f64) {
        {
            let mut h = host.borrow_mut();

            let dt_ms = if h.last_time > 0.0 {
                (time - h.last_time) as f32
            } else {
                REFERENCE_FRAME_MS
            };
            h.last_time = time;

            h.update(dt_ms);
            h.render();
        }

        request_animation_frame(host);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_host::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = headless::run(std::env::args().skip(1).collect()) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::sync::Arc;

    use glam::Vec2;

    use dropfield::consts::REFERENCE_FRAME_MS;
    use dropfield::renderer::{DrawingSurface, VertexBatch};
    use dropfield::sim::{Rect, Region, SceneController, WeightedPool, ZoneRegion};
    use dropfield::{DropError, QualityPreset, Result, SceneSettings};

    /// Frames between drops
    const SPAWN_EVERY: u32 = 12;
    const DEFAULT_FRAMES: u32 = 600;

    /// Command line: `dropfield [--quality low|medium|high] [catalog.json] [frames]`
    #[derive(Debug, PartialEq)]
    pub struct HostArgs {
        pub quality: QualityPreset,
        pub catalog: Option<String>,
        pub frames: u32,
    }

    impl HostArgs {
        pub fn parse(args: Vec<String>) -> Result<Self> {
            let mut quality = QualityPreset::default();
            let mut positional = Vec::new();
            let mut iter = args.into_iter();
            while let Some(arg) = iter.next() {
                if arg == "--quality" {
                    let name = iter.next().unwrap_or_default();
                    quality = name.parse()?;
                } else if let Some(name) = arg.strip_prefix("--quality=") {
                    quality = name.parse()?;
                } else {
                    positional.push(arg);
                }
            }
            let mut positional = positional.into_iter();
            let catalog = positional.next();
            let frames = positional
                .next()
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(DEFAULT_FRAMES);
            Ok(Self {
                quality,
                catalog,
                frames,
            })
        }
    }

    pub fn run(args: Vec<String>) -> Result<()> {
        let HostArgs {
            quality,
            catalog,
            frames,
        } = HostArgs::parse(args)?;
        let catalog = match catalog {
            Some(path) => match std::fs::read_to_string(&path) {
                Ok(json) => json,
                Err(e) => {
                    log::warn!("Could not read {}: {}, using the demo catalog", path, e);
                    super::DEMO_CATALOG.to_string()
                }
            },
            None => super::DEMO_CATALOG.to_string(),
        };

        let pool = WeightedPool::from_json(&catalog)?;
        log::info!("Catalog: {} items, total weight {}", pool.len(), pool.total_weight());

        let canvas = Vec2::new(1280.0, 720.0);
        log::info!("Quality preset: {}", quality.as_str());
        let mut scene = SceneController::new(canvas, SceneSettings::from_preset(quality), 0x5eed);
        let shelves: Arc<dyn Region> = Arc::new(ZoneRegion::new(vec![
            Rect::new(120.0, 160.0, 480.0, 420.0),
            Rect::new(680.0, 220.0, 480.0, 360.0),
        ]));
        scene.set_boundary_source(Some(shelves), None);
        scene.set_toggle("border_glow", true);

        let beams = super::demo_beams();
        let mut batch = VertexBatch::new(canvas);
        let (mut spawned, mut crowded) = (0u32, 0u32);
        let mut peak_vertices = 0usize;

        for frame in 0..frames {
            if frame % SPAWN_EVERY == 0 {
                match scene.spawn_from_pool(&pool, &beams) {
                    Ok(_) => spawned += 1,
                    Err(DropError::NoValidPosition { attempts }) => {
                        crowded += 1;
                        log::debug!("Frame {}: no room after {} attempts", frame, attempts);
                    }
                    Err(e) => return Err(e),
                }
            }
            scene.update(REFERENCE_FRAME_MS);
            scene.render(&mut batch);
            peak_vertices = peak_vertices.max(batch.vertices().len());
        }

        log::info!(
            "Ran {} frames ({:.1} s): {} spawned, {} skipped for space, {} live",
            frames,
            scene.clock_ms() / 1000.0,
            spawned,
            crowded,
            scene.len()
        );
        for (layer, count) in batch.layer_vertex_counts() {
            log::info!("  {:?}: {} vertices", layer, count);
        }
        log::info!(
            "Peak {} vertices on a {}x{} surface",
            peak_vertices,
            batch.size().x,
            batch.size().y
        );
        Ok(())
    }

}
