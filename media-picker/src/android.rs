// JNI bridge to the host activity
//
// Every call attaches the current (blocking) thread to the VM, resolves the
// activity instance through the application class loader and polls static
// result getters until the user is done.

use crate::picker::{path_to_uri, AndroidPickerConfig, PermissionStatus, PickerError, PickerResult};
use jni::objects::{JClass, JObject, JString, JValue};
use jni::JNIEnv;
use ndk_context::android_context;
use std::path::PathBuf;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn jni_err(what: &str) -> impl Fn(jni::errors::Error) -> PickerError + '_ {
    move |e| PickerError::Other(format!("{} failed: {}", what, e))
}

fn get_app_class_loader<'a>(env: &mut JNIEnv<'a>) -> Result<JObject<'a>, PickerError> {
    // ActivityThread.currentActivityThread()
    let at_cls = env
        .find_class("android/app/ActivityThread")
        .map_err(jni_err("find ActivityThread"))?;
    let at = env
        .call_static_method(
            &at_cls,
            "currentActivityThread",
            "()Landroid/app/ActivityThread;",
            &[],
        )
        .map_err(jni_err("currentActivityThread"))?
        .l()
        .map_err(jni_err("currentActivityThread result"))?;

    // Prefer application class loader
    let app = env
        .call_method(&at, "getApplication", "()Landroid/app/Application;", &[])
        .map_err(jni_err("getApplication"))?
        .l()
        .map_err(jni_err("getApplication result"))?;

    let context = if app.is_null() {
        // Fallback: system context
        env.call_method(&at, "getSystemContext", "()Landroid/app/ContextImpl;", &[])
            .map_err(jni_err("getSystemContext"))?
            .l()
            .map_err(jni_err("getSystemContext result"))?
    } else {
        app
    };

    env.call_method(&context, "getClassLoader", "()Ljava/lang/ClassLoader;", &[])
        .map_err(jni_err("getClassLoader"))?
        .l()
        .map_err(jni_err("getClassLoader result"))
}

fn load_class<'a>(
    env: &mut JNIEnv<'a>,
    loader: &JObject<'a>,
    fq_slash: &str,
) -> Result<JClass<'a>, PickerError> {
    // ClassLoader.loadClass wants dots: dev.dioxus.main.MainActivity
    let name: JString = env
        .new_string(fq_slash.replace('/', "."))
        .map_err(jni_err("new_string"))?;
    let cls_obj = env
        .call_method(
            loader,
            "loadClass",
            "(Ljava/lang/String;)Ljava/lang/Class;",
            &[JValue::Object(&JObject::from(name))],
        )
        .map_err(jni_err("ClassLoader.loadClass"))?
        .l()
        .map_err(jni_err("loadClass result"))?;
    Ok(JClass::from(cls_obj))
}

fn companion_instance<'a>(
    env: &mut JNIEnv<'a>,
    cls: &JClass<'a>,
    config: &AndroidPickerConfig,
    signature: &str,
) -> Result<JObject<'a>, PickerError> {
    let comp_signature = format!("L{}$Companion;", config.main_activity_class);
    let comp_obj = env
        .get_static_field(cls, "Companion", &comp_signature)
        .map_err(jni_err("Companion field"))?
        .l()
        .map_err(jni_err("Companion field value"))?;

    if comp_obj.is_null() {
        return Err(PickerError::Other(
            "MainActivity.Companion is null, activity not initialized?".to_string(),
        ));
    }

    env.call_method(&comp_obj, "getInstance", signature, &[])
        .map_err(jni_err("Companion.getInstance()"))?
        .l()
        .map_err(jni_err("Companion.getInstance() result"))
}

fn get_activity_instance<'a>(
    env: &mut JNIEnv<'a>,
    config: &AndroidPickerConfig,
) -> Result<(JObject<'a>, JClass<'a>), PickerError> {
    let loader = get_app_class_loader(env)?;
    let cls = load_class(env, &loader, &config.main_activity_class)?;

    let signature = format!("()L{};", config.main_activity_class);

    // `@JvmStatic getInstance()`, then the `instance` field, then the Companion
    let instance = match env.call_static_method(&cls, "getInstance", &signature, &[]) {
        Ok(val) => val.l().map_err(jni_err("getInstance() result"))?,
        Err(_) => {
            if env.exception_check().unwrap_or(false) {
                let _ = env.exception_clear();
            }

            let field_signature = format!("L{};", config.main_activity_class);
            match env.get_static_field(&cls, "instance", &field_signature) {
                Ok(field) => {
                    let inst = field.l().map_err(jni_err("instance field value"))?;
                    if inst.is_null() {
                        companion_instance(env, &cls, config, &signature)?
                    } else {
                        inst
                    }
                }
                Err(_) => {
                    if env.exception_check().unwrap_or(false) {
                        let _ = env.exception_clear();
                    }
                    companion_instance(env, &cls, config, &signature)?
                }
            }
        }
    };

    if instance.is_null() {
        return Err(PickerError::Other(
            "MainActivity instance is null - Activity not initialized?".to_string(),
        ));
    }

    Ok((instance, cls))
}

/// Reads a nullable `String` from a static no-arg getter
fn static_string<'a>(
    env: &mut JNIEnv<'a>,
    cls: &JClass<'a>,
    method: &str,
) -> Result<Option<String>, PickerError> {
    let Ok(result) = env.call_static_method(cls, method, "()Ljava/lang/String;", &[]) else {
        if env.exception_check().unwrap_or(false) {
            let _ = env.exception_clear();
        }
        return Ok(None);
    };
    let Ok(obj) = result.l() else {
        return Ok(None);
    };
    if obj.is_null() {
        return Ok(None);
    }
    let value: String = env
        .get_string((&obj).into())
        .map_err(jni_err("String conversion"))?
        .into();
    Ok(Some(value))
}

fn with_activity<T>(
    config: &AndroidPickerConfig,
    f: impl for<'a> FnOnce(&mut JNIEnv<'a>, &JObject<'a>, &JClass<'a>) -> Result<T, PickerError>,
) -> Result<T, PickerError> {
    let vm_ptr = android_context().vm() as *mut *const jni::sys::JNIInvokeInterface_;
    let vm = unsafe { jni::JavaVM::from_raw(vm_ptr) }.map_err(jni_err("JavaVM"))?;
    let mut env = vm.attach_current_thread().map_err(jni_err("JNI attach"))?;

    let (activity, main_cls) = get_activity_instance(&mut env, config)?;
    f(&mut env, &activity, &main_cls)
}

/// Shows the media permission dialog and waits for the answer
pub(crate) fn request_permission(
    config: &AndroidPickerConfig,
) -> Result<PermissionStatus, PickerError> {
    with_activity(config, |env, activity, main_cls| {
        env.call_method(activity, "requestMediaLibraryPermission", "()V", &[])
            .map_err(jni_err("requestMediaLibraryPermission"))?;

        let started = Instant::now();
        while started.elapsed() < config.timeout {
            if let Some(status) = static_string(env, main_cls, "getMediaPermissionStatus")? {
                let status = PermissionStatus::parse(&status);
                log::debug!("Media library permission: {:?}", status);
                return Ok(status);
            }
            std::thread::sleep(POLL_INTERVAL);
        }

        Err(PickerError::Timeout(
            "Permission dialog timeout - no answer given".to_string(),
        ))
    })
}

/// Launches the gallery picker and waits for a selection or cancellation
pub(crate) fn launch_picker(
    config: &AndroidPickerConfig,
    options_json: &str,
) -> Result<PickerResult, PickerError> {
    with_activity(config, |env, activity, main_cls| {
        env.call_static_method(main_cls, "clearLastError", "()V", &[])
            .map_err(jni_err("clearLastError"))?;

        let options: JString = env
            .new_string(options_json)
            .map_err(jni_err("new_string"))?;
        env.call_method(
            activity,
            "launchImagePickerWithOptions",
            "(Ljava/lang/String;)V",
            &[JValue::Object(&JObject::from(options))],
        )
        .map_err(jni_err("launchImagePickerWithOptions"))?;

        let started = Instant::now();
        while started.elapsed() < config.timeout {
            std::thread::sleep(POLL_INTERVAL);

            if let Some(path) = static_string(env, main_cls, "getLastPhotoPath")? {
                return Ok(PickerResult::picked(path_to_uri(&PathBuf::from(path))?));
            }

            let cancelled = env
                .call_static_method(main_cls, "wasCancelled", "()Z", &[])
                .and_then(|v| v.z())
                .unwrap_or(false);
            if cancelled {
                log::debug!("Image picker dismissed by user");
                return Ok(PickerResult::cancelled());
            }

            if let Some(err) = static_string(env, main_cls, "getLastError")? {
                return Err(PickerError::Other(err));
            }
        }

        Err(PickerError::Timeout(
            "Image picker timeout - no selection made".to_string(),
        ))
    })
}
