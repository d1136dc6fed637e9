use vk_bootstrap::vulkan::Vulkan;

pub fn main() -> Result<(), vk_bootstrap::BootstrapError> {
    let instance_extensions = Vulkan::available_instance_extensions()?;
    for extension in instance_extensions {
        println!("{}", extension);
    }
    Ok(())
}
