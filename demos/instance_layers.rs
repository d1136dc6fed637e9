use vk_bootstrap::vulkan::Vulkan;

pub fn main() -> Result<(), vk_bootstrap::BootstrapError> {
    let instance_layers = Vulkan::available_instance_layers()?;
    for layer in instance_layers {
        println!("{}", layer);
    }
    Ok(())
}
