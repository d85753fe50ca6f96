mod reconnect;
