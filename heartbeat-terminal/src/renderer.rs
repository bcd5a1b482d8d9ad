/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use heartbeat_core::{
    Camera, Drawable, HeartResult, Lighting, Material, Mesh, Node, Rgb, Scene, SceneRenderer,
    Viewport, Wireframe,
};
use nalgebra::{Matrix4, Point3, Vector3};
use std::io::Write;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Depth slack that lets edges win against the faces they border
const LINE_DEPTH_BIAS: f32 = 1e-3;

/// Strength of the white specular highlight
const SPECULAR_STRENGTH: f32 = 0.25;

/// One character cell of the frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub character: char,
    pub foreground: Rgb,
    pub background: Rgb,
}

impl Cell {
    fn blank(background: Rgb) -> Self {
        Self {
            character: ' ',
            foreground: background,
            background,
        }
    }
}

/// A corner of a triangle after projection
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    depth: f32,
    world: Point3<f32>,
    normal: Vector3<f32>,
}

/// ASCII renderer that converts 3D meshes to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    cells: Vec<Cell>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            cells: vec![Cell::blank(Rgb::new(0, 0, 0)); size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y * self.width + x)
    }

    pub fn clear(&mut self, background: Rgb) {
        self.depth_buffer.fill(f32::INFINITY);
        self.cells.fill(Cell::blank(background));
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(self.width as f32, self.height as f32)
    }

    /// Rasterize the whole scene into the cell buffer
    pub fn rasterize(&mut self, scene: &Scene, camera: &Camera) {
        self.clear(scene.background);
        let root = Matrix4::identity();
        for node in scene.nodes() {
            self.render_node(node, &root, scene, camera);
        }
    }

    fn render_node(&mut self, node: &Node, parent: &Matrix4<f32>, scene: &Scene, camera: &Camera) {
        let world = parent * node.transform.matrix();
        match &node.drawable {
            Drawable::Mesh { mesh, material } => {
                self.render_mesh(mesh, material, &world, camera, &scene.lighting)
            }
            Drawable::Lines(wireframe) => self.render_wireframe(wireframe, &world, camera),
        }
        for child in &node.children {
            self.render_node(child, &world, scene, camera);
        }
    }

    pub fn render_mesh(
        &mut self,
        mesh: &Mesh,
        material: &Material,
        model_matrix: &Matrix4<f32>,
        camera: &Camera,
        lighting: &Lighting,
    ) {
        let viewport = self.viewport();
        'triangles: for triangle in &mesh.triangles {
            let mut corners = [None; 3];
            for (corner, vertex) in corners.iter_mut().zip(&triangle.vertices) {
                let Some((x, y, depth)) =
                    camera.project_to_screen(&vertex.position, model_matrix, &viewport)
                else {
                    continue 'triangles; // Triangle is clipped
                };
                *corner = Some(ScreenVertex {
                    x,
                    y,
                    depth,
                    world: model_matrix.transform_point(&vertex.position),
                    normal: model_matrix
                        .transform_vector(&vertex.normal)
                        .try_normalize(f32::EPSILON)
                        .unwrap_or(vertex.normal),
                });
            }
            if let [Some(v0), Some(v1), Some(v2)] = corners {
                self.rasterize_triangle([v0, v1, v2], material, camera, lighting);
            }
        }
    }

    fn rasterize_triangle(
        &mut self,
        corners: [ScreenVertex; 3],
        material: &Material,
        camera: &Camera,
        lighting: &Lighting,
    ) {
        let [v0, v1, v2] = corners;

        // Bounding box
        let min_x = v0.x.min(v1.x).min(v2.x).floor() as i32;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil() as i32;
        let min_y = v0.y.min(v1.y).min(v2.y).floor() as i32;
        let max_y = v0.y.max(v1.y).max(v2.y).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        // Scanline rasterization
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                // Barycentric coordinates
                let Some((w0, w1, w2)) =
                    barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), (px, py))
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.depth + w1 * v1.depth + w2 * v2.depth;
                let idx = y as usize * self.width + x as usize;
                if depth >= self.depth_buffer[idx] {
                    continue;
                }

                let normal = (v0.normal * w0 + v1.normal * w1 + v2.normal * w2)
                    .try_normalize(f32::EPSILON)
                    .unwrap_or(v0.normal);
                let world = Point3::from(
                    v0.world.coords * w0 + v1.world.coords * w1 + v2.world.coords * w2,
                );
                let (brightness, color) = shade(&world, &normal, material, camera, lighting);

                let ramp_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
                let ramp_index = ramp_index.clamp(1, LUMINOSITY_RAMP.len() - 1);

                self.depth_buffer[idx] = depth;
                self.cells[idx] = Cell {
                    character: LUMINOSITY_RAMP[ramp_index],
                    foreground: color.scaled(1.25),
                    background: color,
                };
            }
        }
    }

    pub fn render_wireframe(
        &mut self,
        wireframe: &Wireframe,
        model_matrix: &Matrix4<f32>,
        camera: &Camera,
    ) {
        let viewport = self.viewport();
        for edge in &wireframe.edges {
            let start = camera.project_to_screen(&edge.start, model_matrix, &viewport);
            let end = camera.project_to_screen(&edge.end, model_matrix, &viewport);
            if let (Some(start), Some(end)) = (start, end) {
                self.draw_line(start, end, wireframe.style.color);
            }
        }
    }

    fn draw_line(&mut self, start: (f32, f32, f32), end: (f32, f32, f32), color: Rgb) {
        let (dx, dy) = (end.0 - start.0, end.1 - start.1);
        let character = line_character(dx, dy);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;

        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let x = (start.0 + dx * t).floor();
            let y = (start.1 + dy * t).floor();
            if x < 0.0 || y < 0.0 || x >= self.width as f32 || y >= self.height as f32 {
                continue;
            }

            let depth = start.2 + (end.2 - start.2) * t;
            let idx = y as usize * self.width + x as usize;
            if depth > self.depth_buffer[idx] + LINE_DEPTH_BIAS {
                continue;
            }
            self.depth_buffer[idx] = self.depth_buffer[idx].min(depth);
            let cell = &mut self.cells[idx];
            cell.character = character;
            cell.foreground = color;
        }
    }

    pub fn present<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current: Option<(Rgb, Rgb)> = None;
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = self.cells[y * self.width + x];

                // Only emit colour changes
                let colors = (cell.foreground, cell.background);
                if current != Some(colors) {
                    writer.queue(SetForegroundColor(to_color(cell.foreground)))?;
                    writer.queue(SetBackgroundColor(to_color(cell.background)))?;
                    current = Some(colors);
                }
                writer.queue(Print(cell.character))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl SceneRenderer for AsciiRenderer {
    fn draw(&mut self, scene: &Scene, camera: &Camera) -> HeartResult<()> {
        self.rasterize(scene, camera);
        Ok(())
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

/// Phong shading: ambient plus diffuse and specular from the point light.
/// Returns the brightness in `0..=1` and the lit colour.
fn shade(
    world: &Point3<f32>,
    normal: &Vector3<f32>,
    material: &Material,
    camera: &Camera,
    lighting: &Lighting,
) -> (f32, Rgb) {
    let ambient = lighting.ambient.intensity * luminance(lighting.ambient.color);
    let to_light = (lighting.point.position - world)
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vector3::z);
    let to_eye = (camera.position - world)
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vector3::z);

    let diffuse = normal.dot(&to_light).max(0.0) * lighting.point.intensity;
    let reflected = normal * (2.0 * normal.dot(&to_light)) - to_light;
    let specular = if diffuse > 0.0 {
        reflected.dot(&to_eye).max(0.0).powf(material.shininess)
            * SPECULAR_STRENGTH
            * lighting.point.intensity
    } else {
        0.0
    };

    let brightness = (ambient + diffuse).min(1.0);
    let lit = material.color.scaled(brightness);
    let highlight = (specular * 255.0).round() as u8;
    let color = Rgb::new(
        lit.r.saturating_add(highlight),
        lit.g.saturating_add(highlight),
        lit.b.saturating_add(highlight),
    );
    ((brightness + specular).min(1.0), color)
}

fn luminance(color: Rgb) -> f32 {
    let [r, g, b] = color.to_linear();
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// Pick a glyph that follows a line's direction on screen (y grows downward)
fn line_character(dx: f32, dy: f32) -> char {
    if dx.abs() > 2.0 * dy.abs() {
        '-'
    } else if dy.abs() > 2.0 * dx.abs() {
        '|'
    } else if dx * dy > 0.0 {
        '\\'
    } else {
        '/'
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
