use crate::error::{GlObject, RenderError};
use crate::geometry::PlaneGeometry;
use crate::gl::{BufferUsage, GraphicsContext};

/// Static GPU copies of the plane's vertex data.
pub struct GeometryBuffers<C: GraphicsContext> {
    pub position: C::Buffer,
    pub uv: C::Buffer,
    pub position_components: i32,
    pub vertex_count: i32,
}

/// Uploads positions (widened to `position_components`) and UVs into two
/// write-once buffers.
pub fn init_buffers<C>(
    context: &C,
    geometry: &PlaneGeometry,
    position_components: i32,
) -> Result<GeometryBuffers<C>, RenderError>
where
    C: GraphicsContext,
{
    let positions = geometry.positions(position_components.max(2) as usize);
    let position = upload(context, &positions)?;
    let uv = upload(context, &geometry.uvs)?;
    Ok(GeometryBuffers {
        position,
        uv,
        position_components,
        vertex_count: geometry.vertex_count() as i32,
    })
}

fn upload<C>(context: &C, data: &[f32]) -> Result<C::Buffer, RenderError>
where
    C: GraphicsContext,
{
    let buffer = context
        .create_buffer()
        .ok_or(RenderError::ObjectCreation(GlObject::Buffer))?;
    context.bind_array_buffer(Some(&buffer));
    context.array_buffer_data(data, BufferUsage::StaticDraw);
    Ok(buffer)
}
