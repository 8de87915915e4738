use anyhow::{Result, anyhow};
use declarative_core::ShapeCache;
use declarative_core::android::{model_type, model_types};

/// Print the shape of one model type, or of all of them
pub fn shape_command(type_name: Option<&str>) -> Result<()> {
    let cache = ShapeCache::new();
    let types = match type_name {
        Some(name) => {
            let ty = model_type(name).ok_or_else(|| {
                let known: Vec<&str> = model_types().iter().map(|t| t.name()).collect();
                anyhow!("Unknown type `{}`, known types: {}", name, known.join(", "))
            })?;
            vec![ty]
        }
        None => model_types(),
    };

    for (i, ty) in types.into_iter().enumerate() {
        if i > 0 {
            println!();
        }
        print!("{}", cache.shape_of(ty));
    }
    Ok(())
}
