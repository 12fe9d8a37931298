use wgpu::util::DeviceExt;

/// Two triangles covering the full viewport.
pub(crate) const QUAD_VERTEX_COUNT: u32 = 6;

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
const TEX_COORD_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x2];

/// Pixel-space positions for a quad covering [0,width] x [0,height].
///
/// Winding matches [`quad_tex_coords`] index for index; reordering either
/// table mirrors or rotates the sampled image.
pub(crate) fn quad_positions(width: f32, height: f32) -> [[f32; 2]; 6] {
    [
        [0.0, 0.0],
        [width, 0.0],
        [0.0, height],
        [0.0, height],
        [width, 0.0],
        [width, height],
    ]
}

/// Unit-square texture coordinates corresponding to [`quad_positions`].
pub(crate) fn quad_tex_coords() -> [[f32; 2]; 6] {
    [
        [0.0, 0.0],
        [1.0, 0.0],
        [0.0, 1.0],
        [0.0, 1.0],
        [1.0, 0.0],
        [1.0, 1.0],
    ]
}

/// The two static vertex buffers feeding the quad's attributes.
pub(crate) struct QuadGeometry {
    pub position_buffer: wgpu::Buffer,
    pub tex_coord_buffer: wgpu::Buffer,
    pub vertex_count: u32,
}

impl QuadGeometry {
    /// Uploads both buffers once; contents are immutable afterwards.
    pub(crate) fn upload(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let positions = quad_positions(width.max(1) as f32, height.max(1) as f32);
        let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad positions"),
            contents: bytemuck::cast_slice(&positions),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let tex_coords = quad_tex_coords();
        let tex_coord_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad tex coords"),
            contents: bytemuck::cast_slice(&tex_coords),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            position_buffer,
            tex_coord_buffer,
            vertex_count: QUAD_VERTEX_COUNT,
        }
    }

    /// Vertex layouts for slot 0 (position) and slot 1 (texture coordinate).
    pub(crate) fn vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 2] {
        [
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &POSITION_ATTRIBUTES,
            },
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &TEX_COORD_ATTRIBUTES,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_tables_have_six_vertices() {
        assert_eq!(quad_positions(100.0, 100.0).len(), QUAD_VERTEX_COUNT as usize);
        assert_eq!(quad_tex_coords().len(), QUAD_VERTEX_COUNT as usize);
    }

    #[test]
    fn position_and_tex_coord_correspond_index_for_index() {
        let width = 100.0;
        let height = 50.0;
        let positions = quad_positions(width, height);
        let tex_coords = quad_tex_coords();

        for (position, tex_coord) in positions.iter().zip(tex_coords.iter()) {
            assert_eq!(position[0] / width, tex_coord[0]);
            assert_eq!(position[1] / height, tex_coord[1]);
        }
    }

    #[test]
    fn triangles_share_the_same_winding() {
        fn signed_area(triangle: &[[f32; 2]]) -> f32 {
            let [a, b, c] = [triangle[0], triangle[1], triangle[2]];
            (b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1])
        }

        let positions = quad_positions(100.0, 100.0);
        let first = signed_area(&positions[0..3]);
        let second = signed_area(&positions[3..6]);
        assert!(first != 0.0 && second != 0.0);
        assert_eq!(first.signum(), second.signum());
    }

    #[test]
    fn quad_spans_the_full_rectangle() {
        let positions = quad_positions(640.0, 480.0);
        let xs: Vec<f32> = positions.iter().map(|p| p[0]).collect();
        let ys: Vec<f32> = positions.iter().map(|p| p[1]).collect();
        assert!(xs.contains(&0.0) && xs.contains(&640.0));
        assert!(ys.contains(&0.0) && ys.contains(&480.0));
    }
}
